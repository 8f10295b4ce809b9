//! Container format and pixel-size detection from raw bytes
//!
//! Nothing here decodes image data. JPEG and PNG headers are walked just far
//! enough to read the frame size; every other format is only identified.
//! All functions are total: malformed or truncated input yields `None`.

pub mod jpeg;
pub mod png;

pub use jpeg::jpeg_dimensions;
pub use png::png_dimensions;

use serde::{Deserialize, Serialize};

/// Pixel size read from an image header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Media container formats accepted as downloads.
///
/// Serialized as the file extension that is written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaFormat {
    #[serde(rename = ".jpg")]
    Jpeg,
    #[serde(rename = ".png")]
    Png,
    #[serde(rename = ".gif")]
    Gif,
    #[serde(rename = ".webp")]
    Webp,
    #[serde(rename = ".bmp")]
    Bmp,
    #[serde(rename = ".avif")]
    Avif,
    #[serde(rename = ".heic")]
    Heic,
    #[serde(rename = ".mp4")]
    Mp4,
    #[serde(rename = ".webm")]
    Webm,
    #[serde(rename = ".mov")]
    Mov,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Jpeg => ".jpg",
            MediaFormat::Png => ".png",
            MediaFormat::Gif => ".gif",
            MediaFormat::Webp => ".webp",
            MediaFormat::Bmp => ".bmp",
            MediaFormat::Avif => ".avif",
            MediaFormat::Heic => ".heic",
            MediaFormat::Mp4 => ".mp4",
            MediaFormat::Webm => ".webm",
            MediaFormat::Mov => ".mov",
        }
    }

    /// Map a `Content-Type` header value (parameters ignored)
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(MediaFormat::Jpeg),
            "image/png" => Some(MediaFormat::Png),
            "image/gif" => Some(MediaFormat::Gif),
            "image/webp" => Some(MediaFormat::Webp),
            "image/bmp" | "image/x-ms-bmp" => Some(MediaFormat::Bmp),
            "image/avif" => Some(MediaFormat::Avif),
            "image/heic" | "image/heif" => Some(MediaFormat::Heic),
            "video/mp4" => Some(MediaFormat::Mp4),
            "video/webm" => Some(MediaFormat::Webm),
            "video/quicktime" => Some(MediaFormat::Mov),
            _ => None,
        }
    }

    /// Map a bare file extension, with or without the leading dot
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jfif" => Some(MediaFormat::Jpeg),
            "png" => Some(MediaFormat::Png),
            "gif" => Some(MediaFormat::Gif),
            "webp" => Some(MediaFormat::Webp),
            "bmp" => Some(MediaFormat::Bmp),
            "avif" => Some(MediaFormat::Avif),
            "heic" | "heif" => Some(MediaFormat::Heic),
            "mp4" | "m4v" => Some(MediaFormat::Mp4),
            "webm" => Some(MediaFormat::Webm),
            "mov" => Some(MediaFormat::Mov),
            _ => None,
        }
    }

    /// Use the extension of the last path segment of a URL, ignoring query and fragment
    pub fn from_url(url: &url::Url) -> Option<Self> {
        let last = url.path_segments()?.next_back()?;
        let (_, extension) = last.rsplit_once('.')?;
        Self::from_extension(extension)
    }
}

impl std::fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Identify the container by its magic bytes
pub fn detect_format(data: &[u8]) -> Option<MediaFormat> {
    if data.starts_with(&jpeg::JPEG_SOI) {
        return Some(MediaFormat::Jpeg);
    }
    if data.starts_with(&png::PNG_SIGNATURE) {
        return Some(MediaFormat::Png);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some(MediaFormat::Gif);
    }
    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some(MediaFormat::Webp);
    }
    if data.starts_with(b"BM") && data.len() >= 26 {
        return Some(MediaFormat::Bmp);
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return iso_bmff_format(&data[8..12]);
    }
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some(MediaFormat::Webm);
    }
    None
}

/// Major brand of an ISO-BMFF `ftyp` box.
///
/// Generic still-image brands (`mif1`, `msf1`) are left undecided so the
/// Content-Type or URL can settle it.
fn iso_bmff_format(brand: &[u8]) -> Option<MediaFormat> {
    match brand {
        b"qt  " => Some(MediaFormat::Mov),
        b"isom" | b"iso2" | b"iso3" | b"iso4" | b"iso5" | b"iso6" | b"mp41" | b"mp42" | b"avc1"
        | b"M4V " | b"dash" => Some(MediaFormat::Mp4),
        b"avif" | b"avis" => Some(MediaFormat::Avif),
        b"heic" | b"heix" | b"heim" | b"heis" => Some(MediaFormat::Heic),
        _ => None,
    }
}

/// Pixel size for formats whose header we parse (JPEG, PNG)
pub fn sniff_dimensions(data: &[u8]) -> Option<ImageDimensions> {
    match detect_format(data)? {
        MediaFormat::Jpeg => jpeg_dimensions(data),
        MediaFormat::Png => png_dimensions(data),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format_magic() {
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(MediaFormat::Jpeg));
        assert_eq!(detect_format(&png::PNG_SIGNATURE), Some(MediaFormat::Png));
        assert_eq!(detect_format(b"GIF89a......"), Some(MediaFormat::Gif));
        assert_eq!(detect_format(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some(MediaFormat::Webp));
        assert_eq!(detect_format(b"\x00\x00\x00\x18ftypmp42"), Some(MediaFormat::Mp4));
        assert_eq!(detect_format(b"\x00\x00\x00\x14ftypqt  "), Some(MediaFormat::Mov));
        assert_eq!(detect_format(&[0x1A, 0x45, 0xDF, 0xA3, 0x01]), Some(MediaFormat::Webm));
        assert_eq!(detect_format(b"<!DOCTYPE html>"), None);
        assert_eq!(detect_format(&[]), None);
    }

    #[test]
    fn test_iso_bmff_brands() {
        assert_eq!(detect_format(b"\x00\x00\x00\x1cftypisom\x00\x00\x02\x00"), Some(MediaFormat::Mp4));
        assert_eq!(detect_format(b"\x00\x00\x00\x1cftypavif\x00\x00\x00\x00"), Some(MediaFormat::Avif));
        assert_eq!(detect_format(b"\x00\x00\x00\x18ftypheic\x00\x00\x00\x00"), Some(MediaFormat::Heic));
        assert_eq!(detect_format(b"\x00\x00\x00\x18ftypmif1\x00\x00\x00\x00"), None);
        assert_eq!(detect_format(b"\x00\x00\x00\x18ftypcrx \x00\x00\x00\x00"), None);
    }

    #[test]
    fn test_gif_has_no_dimensions() {
        let mut gif = b"GIF89a".to_vec();
        gif.extend_from_slice(&[0x10, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(sniff_dimensions(&gif), None);
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(MediaFormat::from_content_type("image/jpeg"), Some(MediaFormat::Jpeg));
        assert_eq!(MediaFormat::from_content_type("IMAGE/PNG; charset=binary"), Some(MediaFormat::Png));
        assert_eq!(MediaFormat::from_content_type("video/mp4"), Some(MediaFormat::Mp4));
        assert_eq!(MediaFormat::from_content_type("text/html"), None);
    }

    #[test]
    fn test_url_extension_ignores_query() {
        let url = url::Url::parse("https://cdn.example.com/v/t51/photo_123.JPEG?stp=dst&oh=abc").unwrap();
        assert_eq!(MediaFormat::from_url(&url), Some(MediaFormat::Jpeg));

        let url = url::Url::parse("https://cdn.example.com/v/clip").unwrap();
        assert_eq!(MediaFormat::from_url(&url), None);
    }

    #[test]
    fn test_format_serializes_as_extension() {
        assert_eq!(serde_json::to_string(&MediaFormat::Jpeg).unwrap(), "\".jpg\"");
        let parsed: MediaFormat = serde_json::from_str("\".webm\"").unwrap();
        assert_eq!(parsed, MediaFormat::Webm);
    }
}
