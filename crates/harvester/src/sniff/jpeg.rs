//! JPEG header scanning

use super::ImageDimensions;

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

const MARKER_PREFIX: u8 = 0xFF;
const MARKER_EOI: u8 = 0xD9;
const MARKER_SOS: u8 = 0xDA;

/// Baseline, extended, progressive and lossless frame headers (SOF0..SOF3)
#[inline]
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xC3)
}

/// Markers that carry no length field
#[inline]
fn is_standalone(marker: u8) -> bool {
    matches!(marker, 0x01 | 0xD0..=0xD7)
}

#[inline]
fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Walk marker segments until a start-of-frame segment yields the frame size.
///
/// Returns `None` when the buffer does not start with SOI, ends before a frame
/// header, or the frame header itself is cut short.
pub fn jpeg_dimensions(data: &[u8]) -> Option<ImageDimensions> {
    if data.len() < 4 || data[..2] != JPEG_SOI {
        return None;
    }

    let mut offset = 2usize;

    while offset < data.len() {
        if data[offset] != MARKER_PREFIX {
            offset += 1;
            continue;
        }

        let marker = *data.get(offset + 1)?;

        // Fill bytes before a marker
        if marker == MARKER_PREFIX {
            offset += 1;
            continue;
        }

        if is_standalone(marker) {
            offset += 2;
            continue;
        }

        if marker == MARKER_EOI || marker == MARKER_SOS {
            return None;
        }

        if is_start_of_frame(marker) {
            let height = read_u16_be(data, offset + 5)?;
            let width = read_u16_be(data, offset + 7)?;
            return Some(ImageDimensions {
                width: u32::from(width),
                height: u32::from(height),
            });
        }

        let length = read_u16_be(data, offset + 2)? as usize;
        offset = offset.checked_add(length + 2)?;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(marker: u8, width: u16, height: u16) -> Vec<u8> {
        let mut out = vec![0xFF, marker, 0x00, 0x11, 0x08];
        out.extend_from_slice(&height.to_be_bytes());
        out.extend_from_slice(&width.to_be_bytes());
        out.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        out
    }

    fn app0() -> Vec<u8> {
        let mut out = vec![0xFF, 0xE0, 0x00, 0x10];
        out.extend_from_slice(b"JFIF\0");
        out.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x48, 0x00, 0x48, 0x00, 0x00]);
        out
    }

    fn jpeg_with(segments: &[Vec<u8>]) -> Vec<u8> {
        let mut out = JPEG_SOI.to_vec();
        for segment in segments {
            out.extend_from_slice(segment);
        }
        out.extend_from_slice(&[0xFF, 0xD9]);
        out
    }

    #[test]
    fn test_sof0_after_app0() {
        let data = jpeg_with(&[app0(), frame(0xC0, 640, 480)]);
        assert_eq!(
            jpeg_dimensions(&data),
            Some(ImageDimensions { width: 640, height: 480 })
        );
    }

    #[test]
    fn test_all_sof_variants() {
        for marker in 0xC0..=0xC3 {
            let data = jpeg_with(&[app0(), frame(marker, 1920, 1080)]);
            assert_eq!(
                jpeg_dimensions(&data),
                Some(ImageDimensions { width: 1920, height: 1080 }),
                "marker {:#04x}",
                marker
            );
        }
    }

    #[test]
    fn test_sof5_is_not_a_frame_match() {
        // 0xC5 is skipped as an ordinary segment and the scan runs out
        let data = jpeg_with(&[frame(0xC5, 100, 100)]);
        assert_eq!(jpeg_dimensions(&data), None);
    }

    #[test]
    fn test_padding_between_segments() {
        let mut padded = app0();
        padded.extend_from_slice(&[0x00, 0x00, 0x00]);
        let data = jpeg_with(&[padded, frame(0xC2, 32, 16)]);
        assert_eq!(
            jpeg_dimensions(&data),
            Some(ImageDimensions { width: 32, height: 16 })
        );
    }

    #[test]
    fn test_no_frame_before_end() {
        let mut data = JPEG_SOI.to_vec();
        data.extend_from_slice(&app0());
        assert_eq!(jpeg_dimensions(&data), None);
    }

    #[test]
    fn test_truncated_frame_header() {
        let mut data = JPEG_SOI.to_vec();
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x02]);
        assert_eq!(jpeg_dimensions(&data), None);
    }

    #[test]
    fn test_segment_length_past_end() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0xFF, 0xFF, 0x00];
        assert_eq!(jpeg_dimensions(&data), None);
    }

    #[test]
    fn test_not_jpeg() {
        assert_eq!(jpeg_dimensions(b"GIF89a\x01\x00\x01\x00"), None);
        assert_eq!(jpeg_dimensions(&[]), None);
        assert_eq!(jpeg_dimensions(&[0xFF]), None);
    }
}
