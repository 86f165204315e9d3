//! Asset store
//!
//! Owns the archive, the device backend and the host-side keyframe mirror.
//! Every successful load uploads its payload exactly once and returns the
//! record the registry will hold. Raw data is never uploaded: it stays in the
//! archive and is copied into guest memory on request.

use std::sync::Arc;

use kiln_common::formats::{parse_mesh, parse_skeleton, parse_sound, parse_texture};
use kiln_common::{ArchivePack, BoneMatrix3x4, KeyframeBlock, MAX_BONES, TextureFormat};

use crate::device::{DeviceBackend, DeviceBudgets, DeviceLocation, DeviceRegion, HeadlessDevice};
use crate::error::ResourceError;
use crate::record::{AssetKind, AssetLocation, AssetMetadata, RawRecord};

/// Maximum number of skeletons per game
pub const MAX_SKELETONS: usize = 64;

/// Maximum number of keyframe collections per game
pub const MAX_KEYFRAME_COLLECTIONS: usize = 256;

/// Where a load reads its payload from
#[derive(Debug, Clone, Copy)]
pub enum AssetSource<'a> {
    /// Guest-supplied bytes in the documented per-kind layout
    Bytes(&'a [u8]),
    /// Entry id in the attached archive
    Archive(&'a str),
}

/// Loaded assets and the memory they live in
pub struct AssetStore {
    device: Box<dyn DeviceBackend>,
    archive: Option<Arc<ArchivePack>>,
    /// Decoded keyframe matrices at the same offsets as the device keyframe region
    keyframe_mirror: Vec<BoneMatrix3x4>,
    skeleton_count: usize,
    keyframe_count: usize,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new(Box::new(HeadlessDevice::default()), None)
    }
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStore")
            .field("archive_assets", &self.archive.as_ref().map(|a| a.asset_count()))
            .field("keyframe_mirror", &self.keyframe_mirror.len())
            .field("skeletons", &self.skeleton_count)
            .field("keyframes", &self.keyframe_count)
            .finish()
    }
}

impl AssetStore {
    pub fn new(device: Box<dyn DeviceBackend>, archive: Option<Arc<ArchivePack>>) -> Self {
        Self {
            device,
            archive,
            keyframe_mirror: Vec::new(),
            skeleton_count: 0,
            keyframe_count: 0,
        }
    }

    /// Store backed by a [`HeadlessDevice`] with the given budgets
    pub fn headless(budgets: DeviceBudgets, archive: Option<Arc<ArchivePack>>) -> Self {
        Self::new(Box::new(HeadlessDevice::new(budgets)), archive)
    }

    pub fn archive(&self) -> Option<&ArchivePack> {
        self.archive.as_deref()
    }

    pub fn device(&self) -> &dyn DeviceBackend {
        self.device.as_ref()
    }

    /// Complete all in-flight uploads
    pub fn fence(&mut self) {
        self.device.fence();
    }

    /// Load one asset and upload its payload
    pub fn load(
        &mut self,
        kind: AssetKind,
        source: AssetSource<'_>,
    ) -> Result<RawRecord, ResourceError> {
        let record = match kind {
            AssetKind::Texture => self.load_texture(source),
            AssetKind::Mesh => self.load_mesh(source),
            AssetKind::Skeleton => self.load_skeleton(source),
            AssetKind::Keyframes => self.load_keyframes(source),
            AssetKind::Font => self.load_font(source),
            AssetKind::Sound => self.load_sound(source),
            AssetKind::RawData => self.load_raw_data(source),
        }?;
        tracing::info!(
            "loaded {} from {}: {} bytes",
            kind,
            match source {
                AssetSource::Bytes(_) => "guest memory".to_string(),
                AssetSource::Archive(id) => format!("archive '{id}'"),
            },
            record.byte_size
        );
        Ok(record)
    }

    /// Stored size of a raw data entry
    pub fn raw_data_len(&self, id: &str) -> Result<u32, ResourceError> {
        Ok(self.find_raw_data(id)?.len() as u32)
    }

    /// Copy a raw data entry into `dest`, all or nothing
    ///
    /// Returns the number of bytes written, which is always the stored size.
    pub fn copy_raw_data(&self, id: &str, dest: &mut [u8]) -> Result<usize, ResourceError> {
        let data = self.find_raw_data(id)?;
        if dest.len() < data.len() {
            return Err(ResourceError::BufferTooSmall {
                needed: data.len(),
                available: dest.len(),
            });
        }
        dest[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    /// One frame of a keyframe collection from the host mirror
    ///
    /// `base` is the collection's first matrix index in the keyframe region.
    pub fn keyframe_frame(
        &self,
        base: u32,
        bone_count: u32,
        frame: u32,
    ) -> Option<&[BoneMatrix3x4]> {
        let start = (frame as usize)
            .checked_mul(bone_count as usize)?
            .checked_add(base as usize)?;
        let end = start.checked_add(bone_count as usize)?;
        self.keyframe_mirror.get(start..end)
    }

    /// The whole keyframe mirror
    pub fn keyframe_mirror(&self) -> &[BoneMatrix3x4] {
        &self.keyframe_mirror
    }

    fn archive_for(&self, kind: AssetKind, id: &str) -> Result<&ArchivePack, ResourceError> {
        self.archive.as_deref().ok_or_else(|| not_found(kind, id))
    }

    fn find_raw_data(&self, id: &str) -> Result<&[u8], ResourceError> {
        self.archive
            .as_deref()
            .and_then(|archive| archive.find_data(id))
            .map(|d| d.data.as_slice())
            .ok_or_else(|| not_found(AssetKind::RawData, id))
    }

    fn upload(
        &mut self,
        region: DeviceRegion,
        bytes: &[u8],
    ) -> Result<DeviceLocation, ResourceError> {
        self.device.upload(region, bytes)
    }

    fn load_texture(&mut self, source: AssetSource<'_>) -> Result<RawRecord, ResourceError> {
        let kind = AssetKind::Texture;
        let (width, height, format, location) = match source {
            AssetSource::Bytes(bytes) => {
                let (header, pixels) =
                    parse_texture(bytes).map_err(|e| ResourceError::decode(kind, e))?;
                let location = self.upload(DeviceRegion::Video, pixels)?;
                (header.width, header.height, TextureFormat::Rgba8, location)
            }
            AssetSource::Archive(id) => {
                let archive = Arc::clone(self.archive_shared(kind, id)?);
                let texture = archive.find_texture(id).ok_or_else(|| not_found(kind, id))?;
                texture.validate().map_err(|e| ResourceError::decode(kind, e))?;
                let location = self.upload(DeviceRegion::Video, &texture.data)?;
                (texture.width, texture.height, texture.format, location)
            }
        };
        Ok(device_record(
            kind,
            location,
            AssetMetadata::Texture {
                width,
                height,
                format,
            },
        ))
    }

    fn load_mesh(&mut self, source: AssetSource<'_>) -> Result<RawRecord, ResourceError> {
        let kind = AssetKind::Mesh;
        let (format, vertex_count, index_count, payload) = match source {
            AssetSource::Bytes(bytes) => {
                let view = parse_mesh(bytes).map_err(|e| ResourceError::decode(kind, e))?;
                let mut payload = Vec::with_capacity(view.vertex_data.len() + view.index_bytes.len());
                payload.extend_from_slice(view.vertex_data);
                payload.extend_from_slice(view.index_bytes);
                (
                    view.header.format,
                    view.header.vertex_count,
                    view.header.index_count,
                    payload,
                )
            }
            AssetSource::Archive(id) => {
                let archive = self.archive_for(kind, id)?;
                let mesh = archive.find_mesh(id).ok_or_else(|| not_found(kind, id))?;
                mesh.validate().map_err(|e| ResourceError::decode(kind, e))?;
                let mut payload = mesh.vertex_data.clone();
                payload.extend(mesh.index_data.iter().flat_map(|i| i.to_le_bytes()));
                (mesh.format, mesh.vertex_count, mesh.index_count, payload)
            }
        };
        let location = self.upload(DeviceRegion::Video, &payload)?;
        Ok(device_record(
            kind,
            location,
            AssetMetadata::Mesh {
                format,
                vertex_count,
                index_count,
            },
        ))
    }

    fn load_skeleton(&mut self, source: AssetSource<'_>) -> Result<RawRecord, ResourceError> {
        let kind = AssetKind::Skeleton;
        if self.skeleton_count >= MAX_SKELETONS {
            return Err(ResourceError::CapacityExceeded {
                what: "skeleton count",
                limit: MAX_SKELETONS,
            });
        }
        let matrices = match source {
            AssetSource::Bytes(bytes) => {
                parse_skeleton(bytes).map_err(|e| ResourceError::decode(kind, e))?
            }
            AssetSource::Archive(id) => {
                let archive = self.archive_for(kind, id)?;
                let skeleton = archive.find_skeleton(id).ok_or_else(|| not_found(kind, id))?;
                skeleton
                    .validate()
                    .map_err(|e| ResourceError::decode(kind, e))?;
                if skeleton.inverse_bind_matrices.len() > MAX_BONES {
                    return Err(ResourceError::decode(
                        kind,
                        format!("bone_count {} exceeds {}", skeleton.bone_count, MAX_BONES),
                    ));
                }
                skeleton.inverse_bind_matrices.clone()
            }
        };
        let location = self.upload(DeviceRegion::Skeleton, bytemuck::cast_slice(&matrices))?;
        self.skeleton_count += 1;
        Ok(device_record(
            kind,
            location,
            AssetMetadata::Skeleton {
                bone_count: matrices.len() as u32,
            },
        ))
    }

    fn load_keyframes(&mut self, source: AssetSource<'_>) -> Result<RawRecord, ResourceError> {
        let kind = AssetKind::Keyframes;
        if self.keyframe_count >= MAX_KEYFRAME_COLLECTIONS {
            return Err(ResourceError::CapacityExceeded {
                what: "keyframe collection count",
                limit: MAX_KEYFRAME_COLLECTIONS,
            });
        }
        let (bone_count, frame_count, matrices) = match source {
            AssetSource::Bytes(bytes) => {
                let block = KeyframeBlock::parse(bytes).map_err(|e| ResourceError::decode(kind, e))?;
                (block.bone_count(), block.frame_count(), block.decode_matrices())
            }
            AssetSource::Archive(id) => {
                let archive = self.archive_for(kind, id)?;
                let packed = archive.find_keyframes(id).ok_or_else(|| not_found(kind, id))?;
                let block = packed.block().map_err(|e| ResourceError::decode(kind, e))?;
                (block.bone_count(), block.frame_count(), block.decode_matrices())
            }
        };

        let location = self.upload(DeviceRegion::Keyframe, bytemuck::cast_slice(&matrices))?;
        debug_assert_eq!(
            location.offset / BoneMatrix3x4::SIZE,
            self.keyframe_mirror.len()
        );
        self.keyframe_mirror.extend_from_slice(&matrices);
        self.keyframe_count += 1;
        Ok(device_record(
            kind,
            location,
            AssetMetadata::Keyframes {
                bone_count,
                frame_count,
            },
        ))
    }

    fn load_font(&mut self, source: AssetSource<'_>) -> Result<RawRecord, ResourceError> {
        let kind = AssetKind::Font;
        let AssetSource::Archive(id) = source else {
            return Err(ResourceError::decode(kind, "fonts can only be loaded from the archive"));
        };
        let archive = Arc::clone(self.archive_shared(kind, id)?);
        let font = archive.find_font(id).ok_or_else(|| not_found(kind, id))?;
        font.validate().map_err(|e| ResourceError::decode(kind, e))?;
        let location = self.upload(DeviceRegion::Video, &font.atlas_data)?;
        Ok(device_record(
            kind,
            location,
            AssetMetadata::Font {
                glyph_count: font.glyphs.len() as u32,
                line_height: font.line_height,
            },
        ))
    }

    fn load_sound(&mut self, source: AssetSource<'_>) -> Result<RawRecord, ResourceError> {
        let kind = AssetKind::Sound;
        let location = match source {
            AssetSource::Bytes(bytes) => {
                let samples = parse_sound(bytes).map_err(|e| ResourceError::decode(kind, e))?;
                self.upload(DeviceRegion::Audio, bytemuck::cast_slice(&samples))?
            }
            AssetSource::Archive(id) => {
                let archive = Arc::clone(self.archive_shared(kind, id)?);
                let sound = archive.find_sound(id).ok_or_else(|| not_found(kind, id))?;
                self.upload(DeviceRegion::Audio, bytemuck::cast_slice(&sound.data))?
            }
        };
        Ok(device_record(
            kind,
            location,
            AssetMetadata::Sound {
                sample_count: (location.len / 2) as u32,
            },
        ))
    }

    fn load_raw_data(&mut self, source: AssetSource<'_>) -> Result<RawRecord, ResourceError> {
        let kind = AssetKind::RawData;
        let AssetSource::Archive(id) = source else {
            return Err(ResourceError::decode(kind, "raw data can only come from the archive"));
        };
        let len = self.find_raw_data(id)?.len();
        Ok(RawRecord {
            kind,
            byte_size: len,
            location: AssetLocation::HostArchive { id: id.to_string() },
            metadata: AssetMetadata::RawData { len: len as u32 },
        })
    }

    fn archive_shared(&self, kind: AssetKind, id: &str) -> Result<&Arc<ArchivePack>, ResourceError> {
        self.archive.as_ref().ok_or_else(|| not_found(kind, id))
    }
}

fn not_found(kind: AssetKind, id: &str) -> ResourceError {
    ResourceError::AssetNotFound {
        kind,
        id: id.to_string(),
    }
}

fn device_record(kind: AssetKind, location: DeviceLocation, metadata: AssetMetadata) -> RawRecord {
    RawRecord {
        kind,
        byte_size: location.len,
        location: AssetLocation::Device(location),
        metadata,
    }
}
