//! Keyframe animation engine
//!
//! Keyframe collections are decoded once at load into bone matrices and
//! uploaded to the device keyframe region. Binding a frame is pointer
//! arithmetic into that region: no decoding, no guest memory, no allocation.
//! Reading a frame copies it out of the host mirror.
//!
//! Both `bind` and `read` wrap the frame index modulo `frame_count`.

use hashbrown::HashMap;
use kiln_common::BoneMatrix3x4;
use xxhash_rust::xxh3::Xxh3;

use crate::asset_store::{AssetSource, AssetStore};
use crate::bound_state::{BoundState, KeyframeSource};
use crate::error::ResourceError;
use crate::handle::Handle;
use crate::record::{AssetKind, AssetMetadata};
use crate::registry::HandleRegistry;

#[cfg(test)]
mod tests;

/// Where a collection's matrices sit in the device keyframe region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyframeGpuInfo {
    /// Matrix index of frame 0, bone 0
    pub base_offset: u32,
    pub bone_count: u32,
    pub frame_count: u32,
}

impl KeyframeGpuInfo {
    /// Matrix index of `frame` (wrapped), bone 0
    #[inline]
    pub fn frame_offset(&self, frame: u32) -> u32 {
        self.base_offset + self.wrap(frame) * self.bone_count
    }

    #[inline]
    pub fn wrap(&self, frame: u32) -> u32 {
        frame % self.frame_count
    }

    /// Bytes one frame occupies when read back
    pub fn frame_bytes(&self) -> usize {
        self.bone_count as usize * BoneMatrix3x4::SIZE
    }
}

/// Per-handle keyframe placement
#[derive(Debug, Default)]
pub struct KeyframeEngine {
    gpu_info: HashMap<Handle, KeyframeGpuInfo>,
}

impl KeyframeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode, upload and register a keyframe collection
    pub fn load(
        &mut self,
        store: &mut AssetStore,
        registry: &mut HandleRegistry,
        source: AssetSource<'_>,
    ) -> Result<Handle, ResourceError> {
        registry.assert_init_phase("keyframes_load")?;
        let record = store.load(AssetKind::Keyframes, source)?;

        let AssetMetadata::Keyframes {
            bone_count,
            frame_count,
        } = record.metadata
        else {
            return Err(ResourceError::decode(
                AssetKind::Keyframes,
                "store returned non-keyframe metadata",
            ));
        };
        let Some(location) = record.device_location() else {
            return Err(ResourceError::decode(
                AssetKind::Keyframes,
                "keyframes were not uploaded",
            ));
        };
        let info = KeyframeGpuInfo {
            base_offset: (location.offset / BoneMatrix3x4::SIZE) as u32,
            bone_count,
            frame_count,
        };

        let handle = registry.register(record)?;
        self.gpu_info.insert(handle, info);
        tracing::info!(
            "keyframes {}: {} bones x {} frames at matrix {}",
            handle,
            bone_count,
            frame_count,
            info.base_offset
        );
        Ok(handle)
    }

    /// Placement of a keyframe handle
    pub fn info(&self, raw: u32) -> Result<KeyframeGpuInfo, ResourceError> {
        Handle::from_raw(raw)
            .and_then(|h| self.gpu_info.get(&h).copied())
            .ok_or(ResourceError::InvalidHandle {
                handle: raw,
                expected: AssetKind::Keyframes,
            })
    }

    /// Bones per frame; 0 for an invalid handle
    pub fn bone_count(&self, raw: u32) -> u32 {
        match self.info(raw) {
            Ok(info) => info.bone_count,
            Err(e) => {
                tracing::warn!("keyframes_bone_count: {}", e);
                0
            }
        }
    }

    /// Frames in the collection; 0 for an invalid handle
    pub fn frame_count(&self, raw: u32) -> u32 {
        match self.info(raw) {
            Ok(info) => info.frame_count,
            Err(e) => {
                tracing::warn!("keyframes_frame_count: {}", e);
                0
            }
        }
    }

    /// Point skinned draws at one frame of a collection
    ///
    /// Handle 0 unbinds. An invalid handle leaves the registers untouched.
    pub fn bind(&self, bound: &mut BoundState, raw: u32, frame: u32) {
        if raw == 0 {
            bound.keyframe_source = KeyframeSource::Static { offset: 0 };
            bound.bone_count = 0;
            bound.keyframes = None;
            tracing::trace!("keyframe_bind: unbound");
            return;
        }
        let Some((handle, info)) = Handle::from_raw(raw)
            .and_then(|h| self.gpu_info.get(&h).map(|info| (h, *info)))
        else {
            tracing::warn!("keyframe_bind: invalid keyframe handle {}", raw);
            return;
        };

        let offset = info.frame_offset(frame);
        bound.keyframe_source = KeyframeSource::Static { offset };
        bound.bone_count = info.bone_count;
        bound.keyframes = Some((handle, info.wrap(frame)));
        tracing::trace!(
            "keyframe_bind: {} frame {} -> offset {} ({} bones)",
            handle,
            frame,
            offset,
            info.bone_count
        );
    }

    /// Copy one frame's matrices into `dest` as row-major f32 LE
    ///
    /// Writes exactly `bone_count × 48` bytes or nothing.
    pub fn read(
        &self,
        store: &AssetStore,
        raw: u32,
        frame: u32,
        dest: &mut [u8],
    ) -> Result<usize, ResourceError> {
        let info = self.info(raw)?;
        let needed = info.frame_bytes();
        if dest.len() < needed {
            return Err(ResourceError::BufferTooSmall {
                needed,
                available: dest.len(),
            });
        }
        let matrices = store
            .keyframe_frame(info.base_offset, info.bone_count, info.wrap(frame))
            .ok_or(ResourceError::InvalidHandle {
                handle: raw,
                expected: AssetKind::Keyframes,
            })?;
        for (out, matrix) in dest[..needed]
            .chunks_exact_mut(BoneMatrix3x4::SIZE)
            .zip(matrices)
        {
            for (bytes, value) in out.chunks_exact_mut(4).zip(matrix.to_array()) {
                bytes.copy_from_slice(&value.to_le_bytes());
            }
        }
        Ok(needed)
    }

    pub fn len(&self) -> usize {
        self.gpu_info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gpu_info.is_empty()
    }

    /// Hash every placement in handle order
    pub(crate) fn hash_into(&self, hasher: &mut Xxh3) {
        let mut entries: Vec<_> = self.gpu_info.iter().collect();
        entries.sort_unstable_by_key(|(h, _)| **h);
        for (handle, info) in entries {
            hasher.update(&handle.to_raw().to_le_bytes());
            hasher.update(&info.base_offset.to_le_bytes());
            hasher.update(&info.bone_count.to_le_bytes());
            hasher.update(&info.frame_count.to_le_bytes());
        }
    }
}
