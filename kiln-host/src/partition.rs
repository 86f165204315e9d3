//! State partitioning
//!
//! Every piece of host-visible state falls in exactly one class:
//!
//! | Class | Restored by rollback | Changes after seal |
//! |---|---|---|
//! | Snapshotted | yes | yes, deterministically |
//! | Immutable after init | no | never |
//! | Render-scoped | no | rebuilt every render pass |
//!
//! [`ImmutableFingerprint`] hashes the immutable class at seal so any later
//! mutation is caught.

use xxhash_rust::xxh3::Xxh3;

use crate::device::DeviceRegion;
use crate::error::ResourceError;
use crate::state::KilnFfiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    Snapshotted,
    ImmutableAfterInit,
    RenderScoped,
}

/// Host-visible state items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostStateItem {
    /// Guest linear memory, including raw data and bones copied into it
    GuestMemory,
    /// RNG, tick count and elapsed time
    RollbackSidecar,
    InputRegisters,
    /// Archive, device uploads and keyframe mirror
    AssetStore,
    HandleRegistry,
    KeyframeGpuInfo,
    InitConfig,
    BoundState,
    DrawCommands,
    AudioQueue,
}

impl HostStateItem {
    pub const ALL: [HostStateItem; 10] = [
        HostStateItem::GuestMemory,
        HostStateItem::RollbackSidecar,
        HostStateItem::InputRegisters,
        HostStateItem::AssetStore,
        HostStateItem::HandleRegistry,
        HostStateItem::KeyframeGpuInfo,
        HostStateItem::InitConfig,
        HostStateItem::BoundState,
        HostStateItem::DrawCommands,
        HostStateItem::AudioQueue,
    ];

    pub fn class(self) -> StateClass {
        match self {
            HostStateItem::GuestMemory
            | HostStateItem::RollbackSidecar
            | HostStateItem::InputRegisters => StateClass::Snapshotted,
            HostStateItem::AssetStore
            | HostStateItem::HandleRegistry
            | HostStateItem::KeyframeGpuInfo
            | HostStateItem::InitConfig => StateClass::ImmutableAfterInit,
            HostStateItem::BoundState
            | HostStateItem::DrawCommands
            | HostStateItem::AudioQueue => StateClass::RenderScoped,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HostStateItem::GuestMemory => "guest memory",
            HostStateItem::RollbackSidecar => "rollback sidecar",
            HostStateItem::InputRegisters => "input registers",
            HostStateItem::AssetStore => "asset store",
            HostStateItem::HandleRegistry => "handle registry",
            HostStateItem::KeyframeGpuInfo => "keyframe gpu info",
            HostStateItem::InitConfig => "init config",
            HostStateItem::BoundState => "bound state",
            HostStateItem::DrawCommands => "draw commands",
            HostStateItem::AudioQueue => "audio queue",
        }
    }

    /// Digest of an immutable item; `None` for other classes
    fn digest(self, state: &KilnFfiState) -> Option<u64> {
        let mut hasher = Xxh3::new();
        match self {
            HostStateItem::AssetStore => {
                hasher.update(bytemuck::cast_slice(state.store.keyframe_mirror()));
                for region in DeviceRegion::ALL {
                    hasher.update(&(state.store.device().used(region) as u64).to_le_bytes());
                }
            }
            HostStateItem::HandleRegistry => {
                for (handle, record) in state.registry.iter() {
                    hasher.update(&handle.to_raw().to_le_bytes());
                    record.hash_into(&mut hasher);
                }
            }
            HostStateItem::KeyframeGpuInfo => state.keyframes.hash_into(&mut hasher),
            HostStateItem::InitConfig => state.init_config.hash_into(&mut hasher),
            _ => return None,
        }
        Some(hasher.digest())
    }
}

/// Hashes of the immutable-after-init state, captured at seal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmutableFingerprint {
    parts: Vec<(HostStateItem, u64)>,
}

impl ImmutableFingerprint {
    pub fn capture(state: &KilnFfiState) -> Self {
        let parts = HostStateItem::ALL
            .iter()
            .filter_map(|&item| item.digest(state).map(|digest| (item, digest)))
            .collect();
        Self { parts }
    }

    /// Fail with `PartitionViolation` naming the first item that changed
    pub fn verify(&self, state: &KilnFfiState) -> Result<(), ResourceError> {
        for &(item, expected) in &self.parts {
            if item.digest(state) != Some(expected) {
                return Err(ResourceError::PartitionViolation { what: item.name() });
            }
        }
        Ok(())
    }

    /// Combined digest of every part
    pub fn digest(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for (_, digest) in &self.parts {
            hasher.update(&digest.to_le_bytes());
        }
        hasher.digest()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::asset_store::{AssetSource, AssetStore};
    use crate::device::DeviceBudgets;
    use crate::record::AssetKind;
    use crate::test_utils::walk_idle_archive;

    fn loaded_state() -> KilnFfiState {
        let mut state = KilnFfiState::new(AssetStore::headless(
            DeviceBudgets::default(),
            Some(Arc::new(walk_idle_archive())),
        ));
        state
            .load_asset(AssetKind::Keyframes, AssetSource::Archive("walk"))
            .unwrap();
        state
            .load_asset(AssetKind::RawData, AssetSource::Archive("level1"))
            .unwrap();
        state
    }

    #[test]
    fn test_every_item_has_one_class() {
        let count = |class| {
            HostStateItem::ALL
                .iter()
                .filter(|i| i.class() == class)
                .count()
        };
        assert_eq!(count(StateClass::Snapshotted), 3);
        assert_eq!(count(StateClass::ImmutableAfterInit), 4);
        assert_eq!(count(StateClass::RenderScoped), 3);
    }

    #[test]
    fn test_fingerprint_covers_immutable_items_only() {
        let fingerprint = ImmutableFingerprint::capture(&loaded_state());
        assert_eq!(fingerprint.parts.len(), 4);
        assert!(
            fingerprint
                .parts
                .iter()
                .all(|(item, _)| item.class() == StateClass::ImmutableAfterInit)
        );
    }

    #[test]
    fn test_render_scoped_changes_pass_verification() {
        let mut state = loaded_state();
        let fingerprint = ImmutableFingerprint::capture(&state);
        state.bound.color = 0x12345678;
        state.keyframes.bind(&mut state.bound, 1, 3);
        state.commands.draw_sky(state.bound.sky);
        assert_eq!(fingerprint.verify(&state), Ok(()));
    }

    #[test]
    fn test_registry_change_is_a_violation() {
        let mut state = loaded_state();
        let fingerprint = ImmutableFingerprint::capture(&state);
        state
            .load_asset(AssetKind::Keyframes, AssetSource::Archive("idle"))
            .unwrap();
        assert!(matches!(
            fingerprint.verify(&state),
            Err(ResourceError::PartitionViolation { .. })
        ));
    }

    #[test]
    fn test_init_config_change_is_a_violation() {
        let mut state = loaded_state();
        let fingerprint = ImmutableFingerprint::capture(&state);
        state.init_config.tick_rate_index = 3;
        assert_eq!(
            fingerprint.verify(&state),
            Err(ResourceError::PartitionViolation {
                what: "init config"
            })
        );
    }
}
