//! Digital input FFI functions
//!
//! Reads the per-player input registers, which are part of the rollback
//! sidecar. Out-of-range players and buttons read as released.

use wasmtime::Caller;

use crate::console::ConsoleInput;
use crate::wasm::{MAX_PLAYERS, WasmGameContext};

fn bit(input: &impl ConsoleInput, button: u32) -> bool {
    button < 32 && input.buttons() & (1 << button) != 0
}

/// Returns 1 while `button` is held by `player`
pub(super) fn button_held<I: ConsoleInput, S>(
    caller: Caller<'_, WasmGameContext<I, S>>,
    player: u32,
    button: u32,
) -> u32 {
    let player = player as usize;
    if player >= MAX_PLAYERS {
        return 0;
    }
    bit(&caller.data().game.input_curr[player], button) as u32
}

/// Returns 1 on the tick `button` went from released to held
pub(super) fn button_pressed<I: ConsoleInput, S>(
    caller: Caller<'_, WasmGameContext<I, S>>,
    player: u32,
    button: u32,
) -> u32 {
    let player = player as usize;
    if player >= MAX_PLAYERS {
        return 0;
    }
    let game = &caller.data().game;
    (bit(&game.input_curr[player], button) && !bit(&game.input_prev[player], button)) as u32
}
