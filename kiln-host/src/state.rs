//! Kiln console FFI state
//!
//! Lives in the wasmtime store next to the core game state and is reached
//! from host functions through the `Caller`. Nothing here is snapshotted:
//! assets, handles and keyframe placement are frozen at seal, and the render
//! registers and command lists are rebuilt every frame.

use std::sync::Arc;

use anyhow::Context;
use kiln_common::ArchivePack;
use kiln_core::ConsoleFfiState;

use crate::asset_store::{AssetSource, AssetStore};
use crate::bound_state::BoundState;
use crate::commands::FrameCommands;
use crate::config::HostConfig;
use crate::error::ResourceError;
use crate::handle::Handle;
use crate::init_config::InitConfig;
use crate::keyframes::KeyframeEngine;
use crate::partition::ImmutableFingerprint;
use crate::record::AssetKind;
use crate::registry::HandleRegistry;

/// Console FFI state for Kiln
#[derive(Debug, Default)]
pub struct KilnFfiState {
    pub store: AssetStore,
    pub registry: HandleRegistry,
    pub keyframes: KeyframeEngine,
    pub bound: BoundState,
    pub commands: FrameCommands,
    pub init_config: InitConfig,
    /// Init-time failures that abort startup at seal
    deferred_failures: Vec<ResourceError>,
    fingerprint: Option<ImmutableFingerprint>,
}

impl KilnFfiState {
    pub fn new(store: AssetStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    /// State backed by a headless device sized from `config`
    pub fn from_config(config: &HostConfig, archive: Option<Arc<ArchivePack>>) -> Self {
        Self::new(AssetStore::headless(
            config.memory.device_budgets(),
            archive,
        ))
    }

    /// Load and register an asset
    pub fn load_asset(
        &mut self,
        kind: AssetKind,
        source: AssetSource<'_>,
    ) -> Result<Handle, ResourceError> {
        if kind == AssetKind::Keyframes {
            return self
                .keyframes
                .load(&mut self.store, &mut self.registry, source);
        }
        self.registry.assert_init_phase("load")?;
        let record = self.store.load(kind, source)?;
        self.registry.register(record)
    }

    /// Remember a failure that must abort startup at seal
    pub fn defer_failure(&mut self, error: ResourceError) {
        tracing::warn!("{} (startup will abort before the first update)", error);
        self.deferred_failures.push(error);
    }

    pub fn deferred_failures(&self) -> &[ResourceError] {
        &self.deferred_failures
    }

    /// Fingerprint recorded at seal
    pub fn fingerprint(&self) -> Option<&ImmutableFingerprint> {
        self.fingerprint.as_ref()
    }

    /// Check that nothing immutable changed since seal
    pub fn verify_partition(&self) -> Result<(), ResourceError> {
        match &self.fingerprint {
            Some(fingerprint) => fingerprint.verify(self),
            None => Ok(()),
        }
    }
}

impl ConsoleFfiState for KilnFfiState {
    fn on_seal(&mut self) -> anyhow::Result<()> {
        self.store.fence();
        if let Some(error) = self.deferred_failures.first() {
            return Err(error.clone()).context("asset load failed during init()");
        }
        self.registry.seal();
        self.fingerprint = Some(ImmutableFingerprint::capture(self));
        tracing::info!(
            "sealed {} assets ({} keyframe collections), tick rate {} Hz",
            self.registry.len(),
            self.keyframes.len(),
            self.init_config.tick_rate()
        );
        Ok(())
    }

    fn begin_render(&mut self) {
        self.bound.reset();
        self.commands.begin_frame();
    }
}
