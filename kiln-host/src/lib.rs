//! Kiln host - asset handles, state partitioning and the guest FFI
//!
//! Games load their assets during `init()`. Each load decodes the payload,
//! uploads it once to a [`DeviceBackend`] and returns an opaque [`Handle`].
//! The first `update()`/`render()` seals the [`HandleRegistry`]; from then on
//! only guest memory and the core sidecar are rolled back, while assets,
//! handles and keyframe placement stay fixed.
//!
//! # Architecture
//!
//! - [`AssetStore`] - Archive lookup, decoding, device uploads, keyframe mirror
//! - [`HandleRegistry`] - Dense handle → record table, sealed after init
//! - [`KeyframeEngine`] - O(1) keyframe binds and bounded frame readback
//! - [`KilnFfiState`] - Everything the FFI reaches through the wasmtime store
//! - [`partition`] - State classes and the immutable fingerprint
//! - [`HeadlessRunner`] - Runs a game with rollback self-checks

pub mod asset_store;
pub mod bound_state;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod init_config;
pub mod input;
pub mod keyframes;
pub mod partition;
pub mod record;
pub mod registry;
pub mod runner;
pub mod state;
#[cfg(test)]
mod test_utils;

pub use asset_store::{AssetSource, AssetStore};
pub use bound_state::{BoundState, DrawState, KeyframeSource};
pub use commands::{AudioCommand, DrawCommand, FrameCommands};
pub use config::HostConfig;
pub use device::{DeviceBackend, DeviceBudgets, DeviceLocation, DeviceRegion, HeadlessDevice};
pub use error::ResourceError;
pub use ffi::{KilnGameContext, create_linker, register_kiln_ffi};
pub use handle::Handle;
pub use input::KilnInput;
pub use keyframes::{KeyframeEngine, KeyframeGpuInfo};
pub use partition::{HostStateItem, ImmutableFingerprint, StateClass};
pub use record::{AssetKind, AssetLocation, AssetMetadata, RawRecord};
pub use registry::{HandleRegistry, RegistryState};
pub use runner::{HeadlessRunner, RunSummary};
pub use state::KilnFfiState;
