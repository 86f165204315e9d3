//! Random number generation FFI functions
//!
//! All values come from the host PCG state, which is part of the rollback
//! sidecar, so replays see the same sequence.

use wasmtime::Caller;

use crate::console::ConsoleInput;
use crate::wasm::WasmGameContext;

/// Generate deterministic random u32
pub(super) fn random<I: ConsoleInput, S>(mut caller: Caller<'_, WasmGameContext<I, S>>) -> u32 {
    caller.data_mut().game.random()
}

/// Generate deterministic random i32 in range [min, max)
pub(super) fn random_range<I: ConsoleInput, S>(
    mut caller: Caller<'_, WasmGameContext<I, S>>,
    min: i32,
    max: i32,
) -> i32 {
    if min >= max {
        return min;
    }
    let range = max.abs_diff(min);
    min.wrapping_add((caller.data_mut().game.random() % range) as i32)
}

/// Generate deterministic random f32 in range [0.0, 1.0)
pub(super) fn random_f32<I: ConsoleInput, S>(mut caller: Caller<'_, WasmGameContext<I, S>>) -> f32 {
    unit_f32(caller.data_mut().game.random())
}

/// Generate deterministic random f32 in range [min, max)
pub(super) fn random_f32_range<I: ConsoleInput, S>(
    mut caller: Caller<'_, WasmGameContext<I, S>>,
    min: f32,
    max: f32,
) -> f32 {
    if min >= max {
        return min;
    }
    let t = unit_f32(caller.data_mut().game.random());
    min + t * (max - min)
}

fn unit_f32(bits: u32) -> f32 {
    (bits as f64 / (u32::MAX as f64 + 1.0)) as f32
}
