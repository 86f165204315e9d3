//! Session FFI functions

use wasmtime::Caller;

use crate::console::ConsoleInput;
use crate::wasm::WasmGameContext;

/// Get number of players in session
pub(super) fn player_count<I: ConsoleInput, S>(caller: Caller<'_, WasmGameContext<I, S>>) -> u32 {
    caller.data().game.player_count
}

/// Get bitmask of local players
pub(super) fn local_player_mask<I: ConsoleInput, S>(
    caller: Caller<'_, WasmGameContext<I, S>>,
) -> u32 {
    caller.data().game.local_player_mask
}
