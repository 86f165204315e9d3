//! System and timing FFI functions

use wasmtime::Caller;

use crate::console::ConsoleInput;
use crate::wasm::{WasmGameContext, read_bytes_from_memory};

/// Get delta time since last tick (seconds)
pub(super) fn delta_time<I: ConsoleInput, S>(caller: Caller<'_, WasmGameContext<I, S>>) -> f32 {
    caller.data().game.delta_time
}

/// Get elapsed time since game start (seconds)
pub(super) fn elapsed_time<I: ConsoleInput, S>(caller: Caller<'_, WasmGameContext<I, S>>) -> f32 {
    caller.data().game.elapsed_time
}

/// Get current tick number
pub(super) fn tick_count<I: ConsoleInput, S>(caller: Caller<'_, WasmGameContext<I, S>>) -> u64 {
    caller.data().game.tick_count
}

/// Log a message from WASM
///
/// Invalid spans and non-UTF-8 text are dropped silently.
pub(super) fn log_message<I: ConsoleInput, S>(
    caller: Caller<'_, WasmGameContext<I, S>>,
    ptr: u32,
    len: u32,
) {
    if let Some(memory) = caller.data().game.memory
        && let Ok(bytes) = read_bytes_from_memory(memory, &caller, ptr, len)
        && let Ok(msg) = std::str::from_utf8(&bytes)
    {
        tracing::info!("[GAME] {}", msg);
    }
}
