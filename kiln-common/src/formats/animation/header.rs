//! Keyframe block header

use super::PACKED_BONE_KEYFRAME_SIZE;
use crate::formats::le_u16;

/// Keyframe block header (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct KeyframeHeader {
    /// Bones per frame
    pub bone_count: u8,
    /// Reserved flags (must be 0)
    pub flags: u8,
    /// Frames in the clip
    pub frame_count: u16,
}

impl KeyframeHeader {
    pub const SIZE: usize = 4;

    pub fn new(bone_count: u8, frame_count: u16) -> Self {
        Self {
            bone_count,
            flags: 0,
            frame_count,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.bone_count;
        bytes[1] = self.flags;
        bytes[2..4].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            bone_count: bytes[0],
            flags: bytes[1],
            frame_count: le_u16(bytes, 2),
        })
    }

    /// Non-zero counts and no flags set
    pub fn is_valid(&self) -> bool {
        self.bone_count > 0 && self.frame_count > 0 && self.flags == 0
    }

    /// Expected frame data size (excluding header)
    pub fn data_size(&self) -> usize {
        self.frame_count as usize * self.bone_count as usize * PACKED_BONE_KEYFRAME_SIZE
    }
}
