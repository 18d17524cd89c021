//! Render Pipeline - One Rendition Per Icon And Size
//!
//! Renditions run strictly one after another. Icons are taken from the end
//! of the list and sizes from the end of each icon, so the last declared
//! (icon, size) pair lands first in the output. Callers that care about
//! output order rely on this.

use std::path::Path;
use std::sync::Arc;

use crate::config::{resolve_icons, ConfigMap, Fingerprint, RenderOptions, ResolvedConfig};
use crate::engine::{ImageEngine, RasterEngine, RasterFormat};
use crate::error::IconError;
use crate::hashing::fingerprint;
use crate::mime::{self, OCTET_STREAM};
use crate::output::{join_uri, AssetDescriptor, IosLink, ManifestIconEntry, RenderOutput};
use crate::sizes::Dimension;
use crate::validation::CanonicalIcon;

/// LIFO work queue over every (icon, size) pair.
#[derive(Debug, Default)]
pub struct RenditionQueue {
    icons: Vec<CanonicalIcon>,
    current: Option<(Arc<CanonicalIcon>, Vec<Dimension>)>,
}

impl RenditionQueue {
    pub fn new(icons: Vec<CanonicalIcon>) -> Self {
        Self {
            icons,
            current: None,
        }
    }

    /// Pairs not yet handed out.
    pub fn remaining(&self) -> usize {
        let pending: usize = self.icons.iter().map(|icon| icon.sizes.len()).sum();
        pending + self.current.as_ref().map_or(0, |(_, sizes)| sizes.len())
    }
}

impl Iterator for RenditionQueue {
    type Item = (Arc<CanonicalIcon>, Dimension);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((icon, sizes)) = &mut self.current {
                if let Some(size) = sizes.pop() {
                    return Some((Arc::clone(icon), size));
                }
            }
            let icon = self.icons.pop()?;
            let sizes = icon.sizes.clone();
            self.current = Some((Arc::new(icon), sizes));
        }
    }
}

/// One encoded output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub buffer: Vec<u8>,
    pub mime_type: String,
    /// `"{w}x{h}"` of the requested size.
    pub dimensions: String,
    pub filename: String,
}

impl Rendition {
    fn into_entries(
        self,
        icon: &CanonicalIcon,
        public_path: &str,
    ) -> (ManifestIconEntry, AssetDescriptor) {
        let output = match icon.destination.as_deref() {
            Some(destination) => join_uri(&[destination, &self.filename]),
            None => self.filename.clone(),
        };
        let url = join_uri(&[public_path, &output]);

        let ios = icon.ios.map(|valid| IosLink {
            valid,
            size: self.dimensions.clone(),
            href: url.clone(),
        });

        let manifest = ManifestIconEntry {
            src: url.clone(),
            sizes: self.dimensions,
            mime_type: self.mime_type,
            purpose: icon.purpose.clone(),
        };
        let asset = AssetDescriptor {
            output,
            url,
            size: self.buffer.len(),
            source: self.buffer,
            ios,
            color: icon.color.clone(),
        };
        (manifest, asset)
    }
}

/// Output filename for one rendition.
pub fn rendition_filename(
    icon: &CanonicalIcon,
    size: Dimension,
    buffer: &[u8],
    mime_type: &str,
    mode: Fingerprint,
) -> String {
    let stem = if icon.preserve_filename {
        Path::new(&icon.src)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("icon")
            .to_string()
    } else {
        format!("icon_{}", size.label())
    };
    let extension = mime::extension_of(mime_type, &icon.src);

    if mode.applies_to_icons() {
        format!("{}.{}.{}", stem, fingerprint(buffer), extension)
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// The icon pipeline - single entry point from configuration to renditions
pub struct IconPipeline<E: ImageEngine = RasterEngine> {
    engine: Arc<E>,
    options: RenderOptions,
}

impl IconPipeline<RasterEngine> {
    pub fn new(options: RenderOptions) -> Self {
        Self::with_engine(RasterEngine::default(), options)
    }
}

impl<E: ImageEngine> IconPipeline<E> {
    pub fn with_engine(engine: E, options: RenderOptions) -> Self {
        Self {
            engine: Arc::new(engine),
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Extract and validate the icons of a configuration.
    pub fn resolve(&self, config: ConfigMap) -> Result<ResolvedConfig, IconError> {
        resolve_icons(config)
    }

    /// Resolve then render. Returns the output and the configuration
    /// without its icon keys.
    pub async fn run(&self, config: ConfigMap) -> Result<(RenderOutput, ConfigMap), IconError> {
        let ResolvedConfig { icons, residual } = self.resolve(config)?;
        let output = self.render(icons).await?;
        Ok((output, residual))
    }

    /// Render every (icon, size) pair. The first failure aborts the batch
    /// and nothing rendered so far is returned.
    pub async fn render(&self, icons: Vec<CanonicalIcon>) -> Result<RenderOutput, IconError> {
        let mut output = RenderOutput::new();
        if icons.is_empty() {
            return Ok(output);
        }

        let queue = RenditionQueue::new(icons);
        log::info!("rendering {} icon rendition(s)", queue.remaining());

        for (icon, size) in queue {
            let rendition = self.render_one(&icon, size).await?;
            log::debug!(
                "rendered '{}' at {} -> {} ({} bytes)",
                icon.src,
                rendition.dimensions,
                rendition.filename,
                rendition.buffer.len()
            );
            let (manifest, asset) = rendition.into_entries(&icon, &self.options.public_path);
            output.push(manifest, asset);
        }

        Ok(output)
    }

    async fn render_one(&self, icon: &CanonicalIcon, size: Dimension) -> Result<Rendition, IconError> {
        let declared = mime::type_of(&icon.src);

        let (buffer, mime_type) = match declared.as_deref().and_then(RasterFormat::from_mime) {
            Some(format) => (self.rasterize(icon, size, format).await?, format.mime().to_string()),
            None => {
                let buffer = std::fs::read(&icon.src).map_err(|e| {
                    IconError::io(&icon.src, format!("It was not possible to read the source: {}", e))
                })?;
                let mime_type = match declared {
                    Some(mime_type) => mime_type,
                    None => {
                        let sniffed = mime::sniff(&buffer);
                        log::warn!(
                            "no MIME type for '{}' from its extension, using {}",
                            icon.src,
                            sniffed.as_deref().unwrap_or(OCTET_STREAM)
                        );
                        sniffed.unwrap_or_else(|| OCTET_STREAM.to_string())
                    }
                };
                (buffer, mime_type)
            }
        };

        let filename =
            rendition_filename(icon, size, &buffer, &mime_type, self.options.fingerprint);

        Ok(Rendition {
            buffer,
            mime_type,
            dimensions: size.label(),
            filename,
        })
    }

    /// Decode, resize and encode on the blocking pool; awaited before the
    /// next rendition starts.
    async fn rasterize(
        &self,
        icon: &CanonicalIcon,
        size: Dimension,
        format: RasterFormat,
    ) -> Result<Vec<u8>, IconError> {
        let engine = Arc::clone(&self.engine);
        let src = icon.src.clone();
        let preserve_aspect_ratio = icon.preserve_aspect_ratio;

        tokio::task::spawn_blocking(move || {
            let image = engine.decode(Path::new(&src)).map_err(|e| {
                IconError::io(&src, format!("It was not possible to read the source: {}", e))
            })?;

            let image = if preserve_aspect_ratio {
                engine.scale_to_fit(image, size.width, size.height)
            } else {
                engine.resize(image, size.width, size.width)
            };

            engine.encode(&image, format).map_err(|e| {
                IconError::io(&src, format!("It was not possible to encode {}: {}", format.mime(), e))
            })
        })
        .await
        .map_err(|e| IconError::io(&icon.src, format!("Render task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon(src: &str, widths: &[u32]) -> CanonicalIcon {
        CanonicalIcon::new(src, widths.iter().map(|w| Dimension::square(*w)).collect())
    }

    #[test]
    fn test_queue_drains_last_icon_and_last_size_first() {
        let queue = RenditionQueue::new(vec![icon("a.png", &[16, 32]), icon("b.png", &[48, 64])]);
        assert_eq!(queue.remaining(), 4);

        let order: Vec<_> = queue.map(|(icon, size)| (icon.src.clone(), size.width)).collect();
        assert_eq!(
            order,
            vec![
                ("b.png".to_string(), 64),
                ("b.png".to_string(), 48),
                ("a.png".to_string(), 32),
                ("a.png".to_string(), 16),
            ]
        );
    }

    #[test]
    fn test_queue_remaining_counts_down() {
        let mut queue = RenditionQueue::new(vec![icon("a.png", &[16, 32])]);
        queue.next();
        assert_eq!(queue.remaining(), 1);
        queue.next();
        assert_eq!(queue.remaining(), 0);
        assert!(queue.next().is_none());
    }

    #[test]
    fn test_filename_synthesized() {
        let name = rendition_filename(
            &icon("assets/a.png", &[48]),
            Dimension::square(48),
            b"bytes",
            "image/png",
            Fingerprint::Off,
        );
        assert_eq!(name, "icon_48x48.png");
    }

    #[test]
    fn test_manifest_only_leaves_icon_names_plain() {
        let name = rendition_filename(
            &icon("a.png", &[48]),
            Dimension::square(48),
            b"bytes",
            "image/png",
            Fingerprint::ManifestOnly,
        );
        assert_eq!(name, "icon_48x48.png");
    }

    #[test]
    fn test_filename_preserved_and_fingerprinted() {
        let mut logo = icon("assets/apple_icon.png", &[48]);
        logo.preserve_filename = true;
        let name = rendition_filename(
            &logo,
            Dimension::square(48),
            b"bytes",
            "image/png",
            Fingerprint::IconsOnly,
        );
        assert_eq!(name, format!("apple_icon.{}.png", fingerprint(b"bytes")));
    }

    #[test]
    fn test_entries_join_destination_and_public_path() {
        let mut logo = icon("a.png", &[48]);
        logo.destination = Some("icons".into());
        logo.purpose = Some("any maskable".into());
        let rendition = Rendition {
            buffer: vec![1, 2, 3],
            mime_type: "image/png".into(),
            dimensions: "48x48".into(),
            filename: "icon_48x48.png".into(),
        };

        let (manifest, asset) = rendition.into_entries(&logo, "/static/");
        assert_eq!(manifest.src, "/static/icons/icon_48x48.png");
        assert_eq!(manifest.purpose.as_deref(), Some("any maskable"));
        assert_eq!(asset.output, "icons/icon_48x48.png");
        assert_eq!(asset.url, manifest.src);
        assert_eq!(asset.size, 3);
        assert!(asset.ios.is_none());
    }
}
