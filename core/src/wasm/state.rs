//! Game state types
//!
//! Minimal core game state - console-agnostic.

use anyhow::{Result, bail};
use wasmtime::{AsContext, Memory, ResourceLimiter, StoreLimits, StoreLimitsBuilder};

use crate::console::ConsoleInput;

/// Maximum number of players
pub const MAX_PLAYERS: usize = 4;

/// Fallback linear memory limit (4MB) for tests and tooling
pub const DEFAULT_RAM_LIMIT: usize = 4 * 1024 * 1024;

/// Minimal core game state (console-agnostic)
///
/// Holds only what every console needs to execute a guest:
/// - WASM memory
/// - Lifecycle phase (init / sealed)
/// - Game loop timing
/// - Player input (generic over console type)
/// - RNG
///
/// Timing, RNG and input are the host rollback sidecar: they live outside
/// guest memory but are saved and restored with it.
pub struct GameState<I: ConsoleInput> {
    /// WASM linear memory (set after instantiation)
    pub memory: Option<Memory>,

    /// Current tick number (for determinism)
    pub tick_count: u64,

    /// Elapsed time since game start (seconds)
    pub elapsed_time: f32,

    /// Delta time for current tick (seconds)
    pub delta_time: f32,

    /// Number of players in session
    pub player_count: u32,

    /// Bitmask of local players (bit N = player N is local)
    pub local_player_mask: u32,

    /// Whether we're currently inside the guest's init()
    pub in_init: bool,

    /// Set once the console state has been sealed (first update/render)
    pub sealed: bool,

    /// RNG state for deterministic random
    pub rng_state: u64,

    /// Input state for all players (previous and current tick)
    pub input_prev: [I; MAX_PLAYERS],
    pub input_curr: [I; MAX_PLAYERS],
}

impl<I: ConsoleInput> GameState<I> {
    /// Create new game state with default values
    pub fn new() -> Self {
        Self {
            memory: None,
            tick_count: 0,
            elapsed_time: 0.0,
            delta_time: 0.0,
            player_count: 1,
            local_player_mask: 1,
            in_init: false,
            sealed: false,
            rng_state: 0,
            input_prev: [I::default(); MAX_PLAYERS],
            input_curr: [I::default(); MAX_PLAYERS],
        }
    }

    /// Seed the RNG with a deterministic value
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng_state = seed;
    }

    /// Generate a deterministic random u32 using PCG algorithm
    pub fn random(&mut self) -> u32 {
        // PCG-XSH-RR
        let old_state = self.rng_state;
        self.rng_state = old_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }
}

impl<I: ConsoleInput> Default for GameState<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Store context combining core state, console FFI state and memory limits
///
/// This is the `T` in `Store<T>` / `Caller<'_, T>` for every host function.
pub struct WasmGameContext<I: ConsoleInput, S> {
    /// Core game state (input, timing, RNG, lifecycle)
    pub game: GameState<I>,
    /// Console-specific FFI state (assets, handles, render registers)
    pub ffi: S,
    /// Linear memory limits enforced through `Store::limiter`
    pub limits: GuestLimits,
}

/// Guest resource limits with a growth freeze
///
/// Wraps [`StoreLimits`] for the RAM cap. Once frozen, every `memory.grow`
/// and `table.grow` fails with -1, so the snapshotted memory range is fixed
/// for the rest of the session.
#[derive(Debug)]
pub struct GuestLimits {
    limits: StoreLimits,
    frozen: bool,
}

impl GuestLimits {
    /// Limits capping linear memory at `ram_limit` bytes
    pub fn new(ram_limit: usize) -> Self {
        Self {
            limits: StoreLimitsBuilder::new()
                .memory_size(ram_limit)
                .instances(1)
                .build(),
            frozen: false,
        }
    }

    /// Refuse all further growth
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

impl ResourceLimiter for GuestLimits {
    fn memory_growing(
        &mut self,
        current: usize,
        desired: usize,
        maximum: Option<usize>,
    ) -> anyhow::Result<bool> {
        if self.frozen {
            tracing::warn!(
                "memory.grow from {} to {} bytes refused after init",
                current,
                desired
            );
            return Ok(false);
        }
        self.limits.memory_growing(current, desired, maximum)
    }

    fn memory_grow_failed(&mut self, error: anyhow::Error) -> anyhow::Result<()> {
        self.limits.memory_grow_failed(error)
    }

    fn table_growing(
        &mut self,
        current: usize,
        desired: usize,
        maximum: Option<usize>,
    ) -> anyhow::Result<bool> {
        if self.frozen {
            return Ok(false);
        }
        self.limits.table_growing(current, desired, maximum)
    }

    fn table_grow_failed(&mut self, error: anyhow::Error) -> anyhow::Result<()> {
        self.limits.table_grow_failed(error)
    }

    fn instances(&self) -> usize {
        self.limits.instances()
    }

    fn tables(&self) -> usize {
        self.limits.tables()
    }

    fn memories(&self) -> usize {
        self.limits.memories()
    }
}

impl<I: ConsoleInput, S: Default> WasmGameContext<I, S> {
    /// Create a context with the fallback RAM limit
    pub fn new() -> Self {
        Self::with_ram_limit(DEFAULT_RAM_LIMIT)
    }

    /// Create a context that caps guest linear memory at `ram_limit` bytes
    pub fn with_ram_limit(ram_limit: usize) -> Self {
        Self {
            game: GameState::new(),
            ffi: S::default(),
            limits: GuestLimits::new(ram_limit),
        }
    }
}

impl<I: ConsoleInput, S: Default> Default for WasmGameContext<I, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `len` bytes starting at `ptr` out of guest memory
///
/// Fails if the span overflows or runs past the end of memory.
pub fn read_bytes_from_memory(
    memory: Memory,
    ctx: impl AsContext,
    ptr: u32,
    len: u32,
) -> Result<Vec<u8>> {
    let data = memory.data(&ctx);
    let start = ptr as usize;
    let Some(end) = start.checked_add(len as usize) else {
        bail!("memory span overflows ({} + {})", ptr, len);
    };
    if end > data.len() {
        bail!(
            "memory access out of bounds ({}-{}, memory size {})",
            start,
            end,
            data.len()
        );
    }
    Ok(data[start..end].to_vec())
}

/// Read a UTF-8 string from guest memory
pub fn read_string_from_memory(
    memory: Memory,
    ctx: impl AsContext,
    ptr: u32,
    len: u32,
) -> Result<String> {
    let bytes = read_bytes_from_memory(memory, ctx, ptr, len)?;
    String::from_utf8(bytes).map_err(|_| anyhow::anyhow!("invalid UTF-8 in guest string"))
}
