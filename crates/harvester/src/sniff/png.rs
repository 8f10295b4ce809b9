use super::ImageDimensions;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

// signature (8) + IHDR length (4) + "IHDR" (4)
const IHDR_WIDTH_OFFSET: usize = 16;
const IHDR_HEIGHT_OFFSET: usize = 20;
const MIN_HEADER_LEN: usize = 24;

#[inline]
fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Width and height from the IHDR chunk that directly follows the signature.
pub fn png_dimensions(data: &[u8]) -> Option<ImageDimensions> {
    if data.len() < MIN_HEADER_LEN || data[..8] != PNG_SIGNATURE {
        return None;
    }

    Some(ImageDimensions {
        width: read_u32_be(data, IHDR_WIDTH_OFFSET)?,
        height: read_u32_be(data, IHDR_HEIGHT_OFFSET)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut out = PNG_SIGNATURE.to_vec();
        out.extend_from_slice(&13u32.to_be_bytes());
        out.extend_from_slice(b"IHDR");
        out.extend_from_slice(&width.to_be_bytes());
        out.extend_from_slice(&height.to_be_bytes());
        out.extend_from_slice(&[0x08, 0x06, 0x00, 0x00, 0x00]);
        out
    }

    #[test]
    fn test_reads_ihdr_fields() {
        let data = png_header(1080, 1350);
        assert_eq!(
            png_dimensions(&data),
            Some(ImageDimensions { width: 1080, height: 1350 })
        );
    }

    #[test]
    fn test_large_values_are_unsigned() {
        let data = png_header(0x8000_0001, 0xFFFF_FFFF);
        assert_eq!(
            png_dimensions(&data),
            Some(ImageDimensions { width: 0x8000_0001, height: 0xFFFF_FFFF })
        );
    }

    #[test]
    fn test_truncated_header() {
        let data = png_header(10, 10);
        assert_eq!(png_dimensions(&data[..23]), None);
        assert_eq!(png_dimensions(&data[..8]), None);
        assert_eq!(png_dimensions(&data[..24]).map(|d| d.height), Some(10));
    }

    #[test]
    fn test_wrong_signature() {
        let mut data = png_header(10, 10);
        data[1] = b'X';
        assert_eq!(png_dimensions(&data), None);
    }
}
