//! Common FFI host functions
//!
//! These functions are available to every Kiln console.
//! Console-specific FFI functions are registered by the console host crate.

mod input;
mod random;
mod session;
mod system;


use anyhow::Result;
use wasmtime::Linker;

use crate::console::{ConsoleFfiState, ConsoleInput};
use crate::wasm::WasmGameContext;

/// Register common FFI functions with the linker
pub fn register_common_ffi<I: ConsoleInput, S: ConsoleFfiState>(
    linker: &mut Linker<WasmGameContext<I, S>>,
) -> Result<()> {
    // System functions
    linker.func_wrap("env", "delta_time", system::delta_time)?;
    linker.func_wrap("env", "elapsed_time", system::elapsed_time)?;
    linker.func_wrap("env", "tick_count", system::tick_count)?;
    linker.func_wrap("env", "log", system::log_message)?;

    // Rollback-safe random numbers
    linker.func_wrap("env", "random", random::random)?;
    linker.func_wrap("env", "random_range", random::random_range)?;
    linker.func_wrap("env", "random_f32", random::random_f32)?;
    linker.func_wrap("env", "random_f32_range", random::random_f32_range)?;

    // Input functions
    linker.func_wrap("env", "button_held", input::button_held)?;
    linker.func_wrap("env", "button_pressed", input::button_pressed)?;

    // Session functions
    linker.func_wrap("env", "player_count", session::player_count)?;
    linker.func_wrap("env", "local_player_mask", session::local_player_mask)?;

    Ok(())
}
