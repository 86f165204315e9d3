//! Asset records
//!
//! A record is the registry's view of one loaded asset: what it is, where its
//! bytes live and the metadata queries need. Records never change after they
//! are registered.

use std::fmt;

use kiln_common::TextureFormat;
use xxhash_rust::xxh3::Xxh3;

use crate::device::DeviceLocation;

/// Asset kinds sharing the global handle space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture,
    Mesh,
    Skeleton,
    Keyframes,
    Font,
    Sound,
    RawData,
}

impl AssetKind {
    fn tag(self) -> u8 {
        match self {
            AssetKind::Texture => 0,
            AssetKind::Mesh => 1,
            AssetKind::Skeleton => 2,
            AssetKind::Keyframes => 3,
            AssetKind::Font => 4,
            AssetKind::Sound => 5,
            AssetKind::RawData => 6,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Texture => "texture",
            AssetKind::Mesh => "mesh",
            AssetKind::Skeleton => "skeleton",
            AssetKind::Keyframes => "keyframes",
            AssetKind::Font => "font",
            AssetKind::Sound => "sound",
            AssetKind::RawData => "data",
        };
        f.write_str(name)
    }
}

/// Where an asset's bytes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// Uploaded to a device region
    Device(DeviceLocation),
    /// Left in the archive; copied into guest memory on request
    HostArchive { id: String },
}

/// Per-kind metadata captured at load
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetMetadata {
    Texture {
        width: u16,
        height: u16,
        format: TextureFormat,
    },
    Mesh {
        format: u8,
        vertex_count: u32,
        index_count: u32,
    },
    Skeleton {
        bone_count: u32,
    },
    Keyframes {
        bone_count: u32,
        frame_count: u32,
    },
    Font {
        glyph_count: u32,
        line_height: f32,
    },
    Sound {
        sample_count: u32,
    },
    RawData {
        len: u32,
    },
}

/// Registry entry for one loaded asset
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub kind: AssetKind,
    pub byte_size: usize,
    pub location: AssetLocation,
    pub metadata: AssetMetadata,
}

impl RawRecord {
    /// Device placement, if the asset was uploaded
    pub fn device_location(&self) -> Option<DeviceLocation> {
        match &self.location {
            AssetLocation::Device(loc) => Some(*loc),
            AssetLocation::HostArchive { .. } => None,
        }
    }

    /// Feed every field into a fingerprint hasher
    pub(crate) fn hash_into(&self, hasher: &mut Xxh3) {
        hasher.update(&[self.kind.tag()]);
        hasher.update(&(self.byte_size as u64).to_le_bytes());
        match &self.location {
            AssetLocation::Device(loc) => {
                hasher.update(&[0, loc.region.tag()]);
                hasher.update(&(loc.offset as u64).to_le_bytes());
                hasher.update(&(loc.len as u64).to_le_bytes());
            }
            AssetLocation::HostArchive { id } => {
                hasher.update(&[1]);
                hasher.update(id.as_bytes());
            }
        }
        match self.metadata {
            AssetMetadata::Texture {
                width,
                height,
                format,
            } => {
                hasher.update(&width.to_le_bytes());
                hasher.update(&height.to_le_bytes());
                hasher.update(&[format as u8]);
            }
            AssetMetadata::Mesh {
                format,
                vertex_count,
                index_count,
            } => {
                hasher.update(&[format]);
                hasher.update(&vertex_count.to_le_bytes());
                hasher.update(&index_count.to_le_bytes());
            }
            AssetMetadata::Skeleton { bone_count } => hasher.update(&bone_count.to_le_bytes()),
            AssetMetadata::Keyframes {
                bone_count,
                frame_count,
            } => {
                hasher.update(&bone_count.to_le_bytes());
                hasher.update(&frame_count.to_le_bytes());
            }
            AssetMetadata::Font {
                glyph_count,
                line_height,
            } => {
                hasher.update(&glyph_count.to_le_bytes());
                hasher.update(&line_height.to_bits().to_le_bytes());
            }
            AssetMetadata::Sound { sample_count } => hasher.update(&sample_count.to_le_bytes()),
            AssetMetadata::RawData { len } => hasher.update(&len.to_le_bytes()),
        }
    }
}
