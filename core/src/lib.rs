//! Kiln Core - console-agnostic host runtime
//!
//! This crate provides the pieces every Kiln console host shares: the WASM
//! engine wrapper, the game instance lifecycle (init → sealed → update/render),
//! deterministic common FFI, and rollback snapshotting of guest memory.
//!
//! # Architecture
//!
//! - [`ConsoleFfiState`] - Hooks a console's FFI state into the game lifecycle
//! - [`GameInstance`] - WASM game loaded and instantiated
//! - [`RollbackStateManager`] - Saves and restores the snapshotted state partition
//! - [`Runtime`] - Fixed timestep driver with a rollback self-check

pub mod console;
pub mod ffi;
pub mod rollback;
pub mod runtime;
#[cfg(test)]
pub mod test_utils;
pub mod wasm;

// Re-export core traits and types
pub use console::{ConsoleFfiState, ConsoleInput};
pub use runtime::{DesyncError, Runtime, RuntimeConfig, SyncTestReport, TickInputs};
pub use wasm::{
    DEFAULT_RAM_LIMIT, GameInstance, GameState, MAX_PLAYERS, WasmEngine, WasmGameContext,
};

// Re-export rollback types
pub use rollback::{
    GameStateSnapshot, HOST_STATE_SIZE, HostRollbackState, LoadStateError, MAX_ROLLBACK_FRAMES,
    MAX_STATE_SIZE, RollbackStateManager, STATE_POOL_SIZE, SaveStateError, StatePool,
};
