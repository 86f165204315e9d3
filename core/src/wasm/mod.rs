//! WASM runtime wrapper
//!
//! Provides abstractions over wasmtime for loading and executing game WASM modules.
//!
//! # Key Types
//!
//! - [`WasmEngine`] - Shared WASM engine (one per application)
//! - [`GameInstance`] - Loaded and instantiated game
//! - [`GameState`] - Minimal core state (input, timing, RNG, lifecycle)
//! - [`WasmGameContext`] - Store context combining core + console FFI state

mod engine;
mod instance;
pub mod state;


pub use engine::WasmEngine;
pub use instance::GameInstance;
pub use state::{
    DEFAULT_RAM_LIMIT, GameState, GuestLimits, MAX_PLAYERS, WasmGameContext,
    read_bytes_from_memory, read_string_from_memory,
};
