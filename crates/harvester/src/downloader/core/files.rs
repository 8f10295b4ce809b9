//! File operation utilities
//!
//! Naming, extension correction and atomic writes for downloaded media.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use url::Url;

use crate::downloader::core::{DownloadError, FileOperation, Result};
use crate::sniff::{self, MediaFormat};

const MAX_IDENTIFIER_LEN: usize = 48;
const FALLBACK_IDENTIFIER: &str = "media";

/// Identifier derived from the last path segment of the URL.
///
/// Only ASCII alphanumerics, `-` and `_` survive; everything else collapses
/// to `_`. The extension is dropped because it is re-applied from the
/// detected format.
pub fn derive_identifier(url: &Url) -> String {
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let stem = match last_segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => last_segment,
    };

    let mut identifier = String::with_capacity(stem.len().min(MAX_IDENTIFIER_LEN));
    for c in stem.chars() {
        if identifier.len() >= MAX_IDENTIFIER_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            identifier.push(c);
        } else if !identifier.ends_with('_') {
            identifier.push('_');
        }
    }

    let identifier = identifier.trim_matches('_');
    if identifier.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        identifier.to_string()
    }
}

/// `{index:03}_{identifier}{ext}`
pub fn build_filename(index: usize, identifier: &str, format: MediaFormat) -> String {
    format!("{:03}_{}{}", index, identifier, format.extension())
}

/// Pick the on-disk format: magic bytes first, then the declared content
/// type, then the URL's extension.
pub fn resolve_format(bytes: &[u8], content_type: Option<&str>, url: &Url) -> Option<MediaFormat> {
    sniff::detect_format(bytes)
        .or_else(|| content_type.and_then(MediaFormat::from_content_type))
        .or_else(|| MediaFormat::from_url(url))
}

/// Create the output directory; failure here is fatal for the run
pub async fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::file_system(dir, FileOperation::CreateDir, e))?;
    debug!("Output directory ready: {}", dir.display());
    Ok(())
}

/// Create a temporary file path for in-flight writes
pub fn create_temp_path(dest_path: &Path) -> PathBuf {
    let mut name = dest_path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest_path.with_file_name(name)
}

/// Write `bytes` to `dir/filename` through a `.part` file and a rename, so a
/// file either exists completely or not at all.
pub async fn write_atomic(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    let dest_path = dir.join(filename);
    let temp_path = create_temp_path(&dest_path);

    fs::write(&temp_path, bytes)
        .await
        .map_err(|e| DownloadError::file_system(&temp_path, FileOperation::Write, e))?;

    if let Err(e) = fs::rename(&temp_path, &dest_path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(DownloadError::file_system(&dest_path, FileOperation::Rename, e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), dest_path.display());
    Ok(dest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_identifier_from_cdn_path() {
        let u = url("https://scontent.cdn.example.com/v/t51.2885-15/448_n.jpg?stp=dst-jpg&_nc_ht=x&oh=00_A");
        assert_eq!(derive_identifier(&u), "448_n");
    }

    #[test]
    fn test_identifier_sanitizes_and_truncates() {
        let u = url("https://cdn.example.com/a%20b..c!d.mp4");
        assert_eq!(derive_identifier(&u), "a_20b_c_d");

        let long = format!("https://cdn.example.com/{}.png", "x".repeat(200));
        assert_eq!(derive_identifier(&url(&long)).len(), MAX_IDENTIFIER_LEN);
    }

    #[test]
    fn test_identifier_fallback() {
        assert_eq!(derive_identifier(&url("https://cdn.example.com/")), "media");
        assert_eq!(derive_identifier(&url("https://cdn.example.com/%%%.jpg")), "media");
    }

    #[test]
    fn test_build_filename_pads_index() {
        assert_eq!(build_filename(7, "clip", MediaFormat::Mp4), "007_clip.mp4");
        assert_eq!(build_filename(1234, "img", MediaFormat::Png), "1234_img.png");
    }

    #[test]
    fn test_resolve_format_prefers_magic_bytes() {
        let u = url("https://cdn.example.com/photo.png");
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(resolve_format(&jpeg, Some("image/png"), &u), Some(MediaFormat::Jpeg));
        assert_eq!(resolve_format(b"????", Some("image/webp"), &u), Some(MediaFormat::Webp));
        assert_eq!(resolve_format(b"????", None, &u), Some(MediaFormat::Png));
        assert_eq!(resolve_format(b"????", None, &url("https://cdn.example.com/blob")), None);
    }

    #[test]
    fn test_resolve_format_still_image_containers() {
        let u = url("https://cdn.example.com/v/shot");
        let avif = b"\x00\x00\x00\x1cftypavif\x00\x00\x00\x00mif1";
        assert_eq!(resolve_format(avif, Some("image/avif"), &u), Some(MediaFormat::Avif));
        assert_eq!(resolve_format(avif, Some("video/mp4"), &u), Some(MediaFormat::Avif));

        let generic = b"\x00\x00\x00\x18ftypmif1\x00\x00\x00\x00heic";
        assert_eq!(resolve_format(generic, Some("image/heic"), &u), Some(MediaFormat::Heic));
        assert_eq!(
            resolve_format(generic, None, &url("https://cdn.example.com/a.avif")),
            Some(MediaFormat::Avif)
        );
        assert_eq!(build_filename(4, "shot", MediaFormat::Avif), "004_shot.avif");
    }

    #[test]
    fn test_temp_path_keeps_extension() {
        let path = Path::new("/out/001_a.jpg");
        assert_eq!(create_temp_path(path), PathBuf::from("/out/001_a.jpg.part"));
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_part_file() {
        let dir = tempdir().unwrap();
        let path = write_atomic(dir.path(), "001_a.jpg", b"abc").await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"abc");
        assert!(!dir.path().join("001_a.jpg.part").exists());
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = write_atomic(&missing, "001_a.jpg", b"abc").await.unwrap_err();
        assert_eq!(err.category(), "file_system");
    }
}
