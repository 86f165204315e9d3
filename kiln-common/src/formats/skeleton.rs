//! Skeleton binary format
//!
//! Inverse bind matrices for GPU skinning.
//!
//! # Layout
//! ```text
//! 0x00: bone_count u32
//! 0x04: reserved u32
//! 0x08: inverse_bind_matrices (bone_count × 48 bytes, 3×4 column-major)
//! ```
//!
//! Each inverse bind matrix is stored as 12 floats in column-major order:
//! [col0.x, col0.y, col0.z, col1.x, col1.y, col1.z, col2.x, col2.y, col2.z, tx, ty, tz]

use super::texture::check_exact;
use super::{FormatError, le_u32};
use crate::console::MAX_BONES;
use crate::math::BoneMatrix3x4;

/// Size of one inverse bind matrix in bytes (12 floats × 4 bytes = 48)
pub const INVERSE_BIND_MATRIX_SIZE: usize = 48;

/// Skeleton header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct SkeletonHeader {
    /// Number of bones in the skeleton
    pub bone_count: u32,
    /// Reserved, written as 0
    pub reserved: u32,
}

impl SkeletonHeader {
    pub const SIZE: usize = 8;

    pub fn new(bone_count: u32) -> Self {
        Self {
            bone_count,
            reserved: 0,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.bone_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            bone_count: le_u32(bytes, 0),
            reserved: le_u32(bytes, 4),
        })
    }
}

/// Decode column-major f32 LE matrices into row-major bone matrices
///
/// `bytes` must hold exactly `n × 48` bytes.
pub fn decode_inverse_bind_matrices(bytes: &[u8]) -> Vec<BoneMatrix3x4> {
    bytes
        .chunks_exact(INVERSE_BIND_MATRIX_SIZE)
        .map(|chunk| {
            let mut cols = [0.0f32; 12];
            for (dst, src) in cols.iter_mut().zip(chunk.chunks_exact(4)) {
                *dst = f32::from_le_bytes([src[0], src[1], src[2], src[3]]);
            }
            BoneMatrix3x4::from_cols_3x4(&cols)
        })
        .collect()
}

/// Validate a skeleton payload and decode its inverse bind matrices
pub fn parse_skeleton(bytes: &[u8]) -> Result<Vec<BoneMatrix3x4>, FormatError> {
    let header = SkeletonHeader::from_bytes(bytes).ok_or(FormatError::TruncatedHeader {
        len: bytes.len(),
        needed: SkeletonHeader::SIZE,
    })?;
    let bone_count = header.bone_count as usize;
    if bone_count == 0 {
        return Err(FormatError::InvalidHeader("skeleton has no bones"));
    }
    if bone_count > MAX_BONES {
        return Err(FormatError::TooLarge {
            what: "bone_count",
            value: bone_count,
            limit: MAX_BONES,
        });
    }
    let body = &bytes[SkeletonHeader::SIZE..];
    check_exact(body.len(), bone_count * INVERSE_BIND_MATRIX_SIZE)?;
    Ok(decode_inverse_bind_matrices(body))
}
