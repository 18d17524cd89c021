//! Result Aggregation - Manifest Entries And Asset Descriptors
//!
//! Both lists grow together, one pair per rendition, in processing order.

use base64::Engine as _;
use serde::{Serialize, Serializer};

use crate::validation::IosMode;

/// One entry of the web manifest `icons` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIconEntry {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// Apple link data carried by an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IosLink {
    pub valid: IosMode,
    pub size: String,
    pub href: String,
}

/// A file the caller has to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetDescriptor {
    /// Path relative to the output root.
    pub output: String,
    pub url: String,
    #[serde(rename = "source_base64", serialize_with = "serialize_base64")]
    pub source: Vec<u8>,
    pub size: usize,
    #[serde(serialize_with = "serialize_ios_link")]
    pub ios: Option<IosLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

fn serialize_ios_link<S: Serializer>(
    link: &Option<IosLink>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match link {
        Some(link) => link.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

/// Final result of a render run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    pub icons: Vec<ManifestIconEntry>,
    pub assets: Vec<AssetDescriptor>,
}

impl RenderOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, icon: ManifestIconEntry, asset: AssetDescriptor) {
        self.icons.push(icon);
        self.assets.push(asset);
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

/// Join URL/path segments with single separators. Empty segments are
/// skipped; a leading `/` or `scheme://` on the first segment survives.
pub fn join_uri(segments: &[&str]) -> String {
    let parts: Vec<&str> = segments.iter().copied().filter(|s| !s.is_empty()).collect();
    let last = parts.len().saturating_sub(1);

    parts
        .iter()
        .enumerate()
        .filter_map(|(i, part)| {
            let mut part = *part;
            if i > 0 {
                part = part.trim_start_matches('/');
            }
            if i < last {
                part = part.trim_end_matches('/');
            }
            (i == 0 || !part.is_empty()).then_some(part)
        })
        .collect::<Vec<_>>()
        .join("/")
}
