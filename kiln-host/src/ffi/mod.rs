//! Kiln FFI host functions
//!
//! Console-specific functions registered with the WASM linker under the
//! `env` module. Init-path failures trap the guest; render-path failures are
//! logged and turn into a no-op or a `0` result.

mod audio;
mod config;
pub(crate) mod guards;
mod keyframes;
mod mesh;
mod render_state;
mod rom;
mod skinning;
mod sky;
mod texture;

#[cfg(test)]
mod tests;

use anyhow::Result;
use wasmtime::Linker;

use kiln_core::WasmEngine;
use kiln_core::ffi::register_common_ffi;
use kiln_core::wasm::WasmGameContext;

use crate::input::KilnInput;
use crate::state::KilnFfiState;

/// Store context for Kiln games
pub type KilnGameContext = WasmGameContext<KilnInput, KilnFfiState>;

/// Register all Kiln-specific FFI functions
pub fn register_kiln_ffi(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    config::register(linker)?;
    render_state::register(linker)?;
    texture::register(linker)?;
    mesh::register(linker)?;
    sky::register(linker)?;
    skinning::register(linker)?;
    keyframes::register(linker)?;
    audio::register(linker)?;
    rom::register(linker)?;
    Ok(())
}

/// Linker with the common and Kiln FFI registered
pub fn create_linker(engine: &WasmEngine) -> Result<Linker<KilnGameContext>> {
    let mut linker = Linker::new(engine.engine());
    register_common_ffi(&mut linker)?;
    register_kiln_ffi(&mut linker)?;
    Ok(linker)
}
