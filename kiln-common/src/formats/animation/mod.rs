//! Keyframe animation block format (.kanim)
//!
//! Sampled bone transforms for one animation clip, compressed to 16 bytes
//! per bone per frame. The host decodes a block once at load time into
//! row-major [`BoneMatrix3x4`](crate::math::BoneMatrix3x4)s.
//!
//! # Layout
//! ```text
//! Header (4 bytes):
//! 0x00: bone_count u8        - Bones per frame (1..=255)
//! 0x01: flags u8             - Reserved, must be 0
//! 0x02: frame_count u16 LE   - Frames in the clip (1..=65535)
//!
//! Frame data (frame_count × bone_count × 16 bytes), frame-major:
//! - rotation: u32 (smallest-three packed quaternion)
//! - position: [u16; 3] (f16 × 3)
//! - scale: [u16; 3] (f16 × 3)
//! ```
//!
//! Bytes after the last frame are ignored.

mod block;
mod header;
mod keyframe;


pub use block::{KeyframeBlock, KeyframeBlockBuilder};
pub use header::KeyframeHeader;
pub use keyframe::{
    PACKED_BONE_KEYFRAME_SIZE, PackedBoneKeyframe, decode_quat_smallest_three,
    encode_quat_smallest_three, f16_to_f32, f32_to_f16,
};

/// Largest bone count a keyframe block can describe (one header byte)
pub const MAX_KEYFRAME_BONES: usize = u8::MAX as usize;

/// File extension for keyframe blocks
pub const KEYFRAME_EXT: &str = "kanim";
