//! The host sidecar: guest-visible state kept outside linear memory

use bytemuck::{Pod, Zeroable};

use crate::console::ConsoleInput;
use crate::wasm::GameState;

/// Size of HostRollbackState in bytes (for inline storage)
pub const HOST_STATE_SIZE: usize = std::mem::size_of::<HostRollbackState>();

/// Host values the guest can observe through the common FFI
///
/// `random()` advances `rng_state`; `tick_count()` and `elapsed_time()` read
/// the timing pair. All three must travel with guest memory, otherwise a
/// replayed tick sees different values than the original did.
///
/// `tick_count` and `elapsed_time` are tick-derived: every `update()` adds
/// exactly one tick and one `delta_time`, so a replay from the same snapshot
/// reproduces them. `rng_state` depends on how many draws the guest made and
/// can only be restored, never recomputed.
///
/// Not included: `delta_time` (set before each update), the session fields
/// (fixed for the session) and the input registers (stored beside this in
/// the snapshot).
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct HostRollbackState {
    pub rng_state: u64,
    pub tick_count: u64,
    /// `f32` bits, keeping the struct POD
    pub elapsed_time_bits: u32,
    _padding: u32,
}

impl HostRollbackState {
    pub fn new(rng_state: u64, tick_count: u64, elapsed_time: f32) -> Self {
        Self {
            rng_state,
            tick_count,
            elapsed_time_bits: elapsed_time.to_bits(),
            _padding: 0,
        }
    }

    /// Read the sidecar out of a running game
    pub fn capture<I: ConsoleInput>(game: &GameState<I>) -> Self {
        Self::new(game.rng_state, game.tick_count, game.elapsed_time)
    }

    /// Write the sidecar back into a game being rolled back
    pub fn restore<I: ConsoleInput>(&self, game: &mut GameState<I>) {
        game.rng_state = self.rng_state;
        game.tick_count = self.tick_count;
        game.elapsed_time = self.elapsed_time();
    }

    pub fn elapsed_time(&self) -> f32 {
        f32::from_bits(self.elapsed_time_bits)
    }
}
