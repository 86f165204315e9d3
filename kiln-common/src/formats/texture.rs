//! Texture binary format
//!
//! # Layout
//! ```text
//! 0x00: width u16
//! 0x02: height u16
//! 0x04: pixel_data (RGBA8: width × height × 4 bytes)
//! ```

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::{FormatError, le_u16};

/// Texture pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub enum TextureFormat {
    /// Uncompressed RGBA8 (4 bytes per pixel)
    #[default]
    Rgba8,
    /// BC7 compressed (16 bytes per 4×4 block)
    Bc7,
}

impl TextureFormat {
    /// Calculate data size for given dimensions
    pub fn data_size(&self, width: u16, height: u16) -> usize {
        let w = width as usize;
        let h = height as usize;
        match self {
            TextureFormat::Rgba8 => w * h * 4,
            TextureFormat::Bc7 => w.div_ceil(4) * h.div_ceil(4) * 16,
        }
    }
}

/// Texture header (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct TextureHeader {
    pub width: u16,
    pub height: u16,
}

impl TextureHeader {
    pub const SIZE: usize = 4;

    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Calculate RGBA8 pixel data size (4 bytes per pixel)
    pub fn rgba8_size(&self) -> usize {
        TextureFormat::Rgba8.data_size(self.width, self.height)
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.width.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.height.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            width: le_u16(bytes, 0),
            height: le_u16(bytes, 2),
        })
    }
}

/// Validate a header + RGBA8 payload and return the header and pixels
pub fn parse_texture(bytes: &[u8]) -> Result<(TextureHeader, &[u8]), FormatError> {
    let header = TextureHeader::from_bytes(bytes).ok_or(FormatError::TruncatedHeader {
        len: bytes.len(),
        needed: TextureHeader::SIZE,
    })?;
    if header.width == 0 || header.height == 0 {
        return Err(FormatError::InvalidHeader("zero texture dimension"));
    }
    let pixels = &bytes[TextureHeader::SIZE..];
    check_exact(pixels.len(), header.rgba8_size())?;
    Ok((header, pixels))
}

/// Exact payload length check shared by the POD formats
pub(crate) fn check_exact(len: usize, expected: usize) -> Result<(), FormatError> {
    if len < expected {
        Err(FormatError::TruncatedBody {
            len,
            needed: expected,
        })
    } else if len > expected {
        Err(FormatError::SizeMismatch { len, expected })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture_bytes(width: u16, height: u16, pixels: usize) -> Vec<u8> {
        let mut bytes = TextureHeader::new(width, height).to_bytes().to_vec();
        bytes.resize(TextureHeader::SIZE + pixels, 0x7F);
        bytes
    }

    #[test]
    fn test_header_parsing() {
        let data = [0x40, 0x00, 0x20, 0x00];
        let header = TextureHeader::from_bytes(&data).unwrap();
        assert_eq!(header, TextureHeader::new(64, 32));
        assert_eq!(header.rgba8_size(), 64 * 32 * 4);
    }

    #[test]
    fn test_bc7_size_non_aligned() {
        // 30×30 rounds up to 8×8 blocks
        assert_eq!(TextureFormat::Bc7.data_size(30, 30), 8 * 8 * 16);
    }

    #[test]
    fn test_parse_texture_ok() {
        let bytes = texture_bytes(2, 2, 16);
        let (header, pixels) = parse_texture(&bytes).unwrap();
        assert_eq!(header.width, 2);
        assert_eq!(pixels.len(), 16);
    }

    #[test]
    fn test_parse_texture_rejects_bad_payloads() {
        assert!(matches!(
            parse_texture(&[1, 0]),
            Err(FormatError::TruncatedHeader { .. })
        ));
        assert!(matches!(
            parse_texture(&texture_bytes(0, 4, 0)),
            Err(FormatError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_texture(&texture_bytes(2, 2, 15)),
            Err(FormatError::TruncatedBody { needed: 16, .. })
        ));
        assert!(matches!(
            parse_texture(&texture_bytes(2, 2, 17)),
            Err(FormatError::SizeMismatch { expected: 16, .. })
        ));
    }
}
