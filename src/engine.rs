//! Image Engine - Decode, Resize, Encode
//!
//! The pipeline only talks to this trait. `RasterEngine` backs it with the
//! `image` crate; tests swap in their own engine.

use std::error::Error;
use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

pub type EngineError = Box<dyn Error + Send + Sync>;
pub type EngineResult<T> = Result<T, EngineError>;

/// Raster types the engine decodes and re-encodes. Everything else is
/// passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Bmp,
}

impl RasterFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
        }
    }
}

/// Narrow interface to an image library.
pub trait ImageEngine: Send + Sync + 'static {
    type Image: Send + 'static;

    fn decode(&self, path: &Path) -> EngineResult<Self::Image>;

    /// Fit inside `width` x `height`, keeping the aspect ratio.
    fn scale_to_fit(&self, image: Self::Image, width: u32, height: u32) -> Self::Image;

    /// Exact resize, ignoring the aspect ratio.
    fn resize(&self, image: Self::Image, width: u32, height: u32) -> Self::Image;

    fn encode(&self, image: &Self::Image, format: RasterFormat) -> EngineResult<Vec<u8>>;
}

/// `image`-crate engine.
#[derive(Debug, Clone, Copy)]
pub struct RasterEngine {
    pub filter: FilterType,
}

impl RasterEngine {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for RasterEngine {
    fn default() -> Self {
        Self::new(FilterType::Lanczos3)
    }
}

impl ImageEngine for RasterEngine {
    type Image = DynamicImage;

    fn decode(&self, path: &Path) -> EngineResult<DynamicImage> {
        Ok(image::open(path)?)
    }

    fn scale_to_fit(&self, image: DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize(width, height, self.filter)
    }

    fn resize(&self, image: DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, self.filter)
    }

    fn encode(&self, image: &DynamicImage, format: RasterFormat) -> EngineResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        match format {
            // JPEG has no alpha channel
            RasterFormat::Jpeg => {
                DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut cursor, format.image_format())?
            }
            _ => image.write_to(&mut cursor, format.image_format())?,
        }
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageBuffer, Rgba};

    fn sample(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, 128, 255])
        }))
    }

    #[test]
    fn test_scale_to_fit_keeps_ratio() {
        let engine = RasterEngine::default();
        let scaled = engine.scale_to_fit(sample(200, 100), 50, 50);
        assert_eq!(scaled.dimensions(), (50, 25));
    }

    #[test]
    fn test_resize_exact() {
        let engine = RasterEngine::default();
        let resized = engine.resize(sample(200, 100), 48, 48);
        assert_eq!(resized.dimensions(), (48, 48));
    }

    #[test]
    fn test_encode_round_trips_format() {
        let engine = RasterEngine::new(FilterType::Nearest);
        for format in [RasterFormat::Png, RasterFormat::Jpeg, RasterFormat::Bmp] {
            let bytes = engine.encode(&sample(8, 8), format).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), format.image_format());
        }
    }

    #[test]
    fn test_decode_missing_file_errors() {
        let engine = RasterEngine::default();
        assert!(engine.decode(Path::new("/nonexistent/icon.png")).is_err());
    }

    #[test]
    fn test_mime_mapping() {
        assert_eq!(RasterFormat::from_mime("image/png"), Some(RasterFormat::Png));
        assert_eq!(RasterFormat::from_mime("image/svg+xml"), None);
        assert_eq!(RasterFormat::Jpeg.mime(), "image/jpeg");
    }
}
