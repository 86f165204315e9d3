//! Shared types and formats for the Kiln fantasy console
//!
//! This crate holds everything both the host runtime and asset tooling need
//! to agree on byte-for-byte:
//!
//! - [`math`] - POD bone matrices
//! - [`formats`] - Binary asset layouts, the keyframe codec and the archive pack
//! - [`console`] - Console constants (resolutions, tick rates, limits)

pub mod console;
pub mod formats;
pub mod math;

pub use console::{DEFAULT_RESOLUTION, DEFAULT_TICK_RATE, MAX_BONES, RESOLUTIONS, TICK_RATES};
pub use math::BoneMatrix3x4;

pub use formats::{
    ARCHIVE_EXT, ARCHIVE_MAGIC, ARCHIVE_VERSION, ArchiveError, ArchivePack, BinarySerializable,
    FormatError, KEYFRAME_EXT, KeyframeBlock, KeyframeBlockBuilder, KeyframeHeader,
    MAX_KEYFRAME_BONES, MeshHeader, PackedBoneKeyframe, PackedData, PackedFont, PackedGlyph,
    PackedKeyframes, PackedMesh, PackedSkeleton, PackedSound, PackedTexture, SkeletonHeader,
    SoundHeader, TextureFormat, TextureHeader,
};
