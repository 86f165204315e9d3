//! Handle registry
//!
//! Issues handles for loaded assets and resolves them back to records.
//! Handles are dense (1, 2, 3, ...), so the registry is a plain vector
//! indexed by `handle - 1`.

use crate::error::ResourceError;
use crate::handle::Handle;
use crate::record::{AssetKind, RawRecord};

/// Registry lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryState {
    /// Init phase: assets may be registered
    #[default]
    Open,
    /// After the first update/render: read-only
    Sealed,
}

/// Handle → record table
#[derive(Debug, Default)]
pub struct HandleRegistry {
    records: Vec<RawRecord>,
    state: RegistryState,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record, returning its new handle
    pub fn register(&mut self, record: RawRecord) -> Result<Handle, ResourceError> {
        self.assert_init_phase("register")?;
        let next = u32::try_from(self.records.len() + 1).ok().and_then(Handle::from_raw);
        let Some(handle) = next else {
            return Err(ResourceError::CapacityExceeded {
                what: "handle",
                limit: u32::MAX as usize,
            });
        };
        self.records.push(record);
        Ok(handle)
    }

    pub fn resolve(&self, handle: Handle) -> Option<&RawRecord> {
        self.records.get(handle.index())
    }

    /// Resolve a guest handle, requiring a specific kind
    pub fn resolve_kind(
        &self,
        raw: u32,
        kind: AssetKind,
    ) -> Result<(Handle, &RawRecord), ResourceError> {
        Handle::from_raw(raw)
            .and_then(|h| self.resolve(h).map(|r| (h, r)))
            .filter(|(_, record)| record.kind == kind)
            .ok_or(ResourceError::InvalidHandle {
                handle: raw,
                expected: kind,
            })
    }

    /// Fail with `NotInitPhase` once sealed
    pub fn assert_init_phase(&self, operation: &'static str) -> Result<(), ResourceError> {
        match self.state {
            RegistryState::Open => Ok(()),
            RegistryState::Sealed => Err(ResourceError::NotInitPhase { operation }),
        }
    }

    /// Freeze the registry; idempotent
    pub fn seal(&mut self) {
        if self.state == RegistryState::Open {
            tracing::debug!("handle registry sealed with {} records", self.records.len());
        }
        self.state = RegistryState::Sealed;
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_sealed(&self) -> bool {
        self.state == RegistryState::Sealed
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in handle order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &RawRecord)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| Handle::from_raw(i as u32 + 1).map(|h| (h, r)))
    }

    /// Number of records of one kind
    pub fn count(&self, kind: AssetKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AssetLocation, AssetMetadata};

    fn data_record(len: u32) -> RawRecord {
        RawRecord {
            kind: AssetKind::RawData,
            byte_size: len as usize,
            location: AssetLocation::HostArchive {
                id: format!("blob{len}"),
            },
            metadata: AssetMetadata::RawData { len },
        }
    }

    #[test]
    fn test_handles_are_sequential_from_one() {
        let mut registry = HandleRegistry::new();
        let handles: Vec<u32> = (0..4)
            .map(|i| registry.register(data_record(i)).unwrap().to_raw())
            .collect();
        assert_eq!(handles, vec![1, 2, 3, 4]);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_register_after_seal_fails() {
        let mut registry = HandleRegistry::new();
        registry.register(data_record(1)).unwrap();
        registry.seal();
        registry.seal();
        assert!(registry.is_sealed());
        for _ in 0..3 {
            assert_eq!(
                registry.register(data_record(2)),
                Err(ResourceError::NotInitPhase {
                    operation: "register"
                })
            );
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_kind_rejects_zero_unknown_and_wrong_kind() {
        let mut registry = HandleRegistry::new();
        let h = registry.register(data_record(3)).unwrap();

        assert!(registry.resolve_kind(h.to_raw(), AssetKind::RawData).is_ok());
        for (raw, kind) in [
            (0, AssetKind::RawData),
            (99, AssetKind::RawData),
            (h.to_raw(), AssetKind::Keyframes),
        ] {
            assert_eq!(
                registry.resolve_kind(raw, kind).unwrap_err(),
                ResourceError::InvalidHandle {
                    handle: raw,
                    expected: kind
                }
            );
        }
    }

    #[test]
    fn test_independent_registries() {
        let mut a = HandleRegistry::new();
        let mut b = HandleRegistry::new();
        a.register(data_record(1)).unwrap();
        a.register(data_record(2)).unwrap();
        assert_eq!(b.register(data_record(3)).unwrap().to_raw(), 1);
        assert_eq!(a.count(AssetKind::RawData), 2);
        assert_eq!(b.iter().count(), 1);
    }
}
