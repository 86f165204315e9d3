//! Sound binary format
//!
//! Mono 16-bit PCM at a fixed sample rate.
//!
//! # Layout
//! ```text
//! 0x00: total_samples u32 LE
//! 0x04: flags u8
//! 0x05: reserved (3 bytes)
//! 0x08: i16 LE PCM samples (total_samples × 2 bytes)
//! ```

use super::texture::check_exact;
use super::{FormatError, le_u32};

/// Console sample rate (fixed)
pub const SAMPLE_RATE: u32 = 22050;

/// Sound header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct SoundHeader {
    pub total_samples: u32,
    /// Reserved flags, must be 0
    pub flags: u8,
    pub _reserved: [u8; 3],
}

impl SoundHeader {
    pub const SIZE: usize = 8;

    pub fn new(total_samples: u32) -> Self {
        Self {
            total_samples,
            flags: 0,
            _reserved: [0; 3],
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.total_samples.to_le_bytes());
        bytes[4] = self.flags;
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            total_samples: le_u32(bytes, 0),
            flags: bytes[4],
            _reserved: [0; 3],
        })
    }
}

/// Validate a sound payload and decode its PCM samples
pub fn parse_sound(bytes: &[u8]) -> Result<Vec<i16>, FormatError> {
    let header = SoundHeader::from_bytes(bytes).ok_or(FormatError::TruncatedHeader {
        len: bytes.len(),
        needed: SoundHeader::SIZE,
    })?;
    if header.flags != 0 {
        return Err(FormatError::InvalidHeader("non-zero sound flags"));
    }
    let body = &bytes[SoundHeader::SIZE..];
    check_exact(body.len(), header.total_samples as usize * 2)?;
    Ok(body
        .chunks_exact(2)
        .map(|s| i16::from_le_bytes([s[0], s[1]]))
        .collect())
}

/// Encode PCM samples with a header
pub fn encode_sound(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(SoundHeader::SIZE + samples.len() * 2);
    bytes.extend_from_slice(&SoundHeader::new(samples.len() as u32).to_bytes());
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}
