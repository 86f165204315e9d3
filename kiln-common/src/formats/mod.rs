//! Kiln binary asset formats
//!
//! Guest-supplied asset bytes are POD layouts with a small fixed header and no
//! magic: the format is determined by which FFI function receives them.
//! Archive packs (`.kpak`) carry the same assets pre-parsed, keyed by string id.
//!
//! All headers implement [`BinarySerializable`]. Whole payloads are validated
//! by the `parse` functions, which fail with [`FormatError`].

pub mod animation;
pub mod archive;
mod error;
pub mod mesh;
mod serialization;
pub mod skeleton;
pub mod sound;
pub mod texture;

pub use animation::*;
pub use archive::*;
pub use error::FormatError;
pub use mesh::*;
pub use serialization::BinarySerializable;
pub use skeleton::*;
pub use sound::*;
pub use texture::*;

/// Read a little-endian u16 at `offset`; caller guarantees the bounds
#[inline]
pub(crate) fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

/// Read a little-endian u32 at `offset`; caller guarantees the bounds
#[inline]
pub(crate) fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
