//! MIME Resolution - Source Types And Output Extensions

use std::path::Path;

use crate::engine::RasterFormat;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type guessed from the path's extension.
pub fn type_of(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first_raw()
        .map(|mime| mime.to_string())
}

/// MIME type sniffed from the leading bytes.
pub fn sniff(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}

/// File extension for an output of type `mime` produced from `src`.
///
/// Raster formats map to one fixed extension. Anything else keeps the
/// source's own extension when it is registered for `mime`.
pub fn extension_of(mime: &str, src: &str) -> String {
    if let Some(format) = RasterFormat::from_mime(mime) {
        return format.extension().to_string();
    }

    let own = Path::new(src)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    if mime == OCTET_STREAM {
        return own.unwrap_or_else(|| "bin".to_string());
    }

    if let Some(registered) = mime_guess::get_mime_extensions_str(mime) {
        if let Some(ext) = own.as_deref().filter(|ext| registered.iter().any(|r| r == ext)) {
            return ext.to_string();
        }
        if let Some(first) = registered.first() {
            return first.to_string();
        }
    }

    own.unwrap_or_else(|| "bin".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_of_common_sources() {
        assert_eq!(type_of("icons/logo.png").as_deref(), Some("image/png"));
        assert_eq!(type_of("logo.JPG").as_deref(), Some("image/jpeg"));
        assert_eq!(type_of("logo.bmp").as_deref(), Some("image/bmp"));
        assert_eq!(type_of("logo.svg").as_deref(), Some("image/svg+xml"));
        assert_eq!(type_of("logo"), None);
    }

    #[test]
    fn test_raster_extensions_fixed() {
        assert_eq!(extension_of("image/png", "a.PNG"), "png");
        assert_eq!(extension_of("image/jpeg", "a.jpeg"), "jpg");
        assert_eq!(extension_of("image/bmp", "a.bmp"), "bmp");
    }

    #[test]
    fn test_pass_through_keeps_own_extension() {
        assert_eq!(extension_of("image/svg+xml", "a.svg"), "svg");
        assert_eq!(extension_of(OCTET_STREAM, "blob.weird"), "weird");
        assert_eq!(extension_of(OCTET_STREAM, "blob"), "bin");
    }

    #[test]
    fn test_sniff_png_signature() {
        let header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(sniff(&header).as_deref(), Some("image/png"));
        assert_eq!(sniff(b"plain text"), None);
    }
}
