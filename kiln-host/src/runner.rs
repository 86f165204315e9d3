//! Headless runner
//!
//! Instantiates a game against a [`HeadlessDevice`](crate::device::HeadlessDevice),
//! runs its init, then drives a fixed number of ticks with seeded inputs.
//! With a non-zero check distance every window of ticks is rolled back and
//! replayed; the replay must reproduce guest memory and the recorded
//! command stream, and the immutable partition must be untouched at the end.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use kiln_common::ArchivePack;
use kiln_core::{
    GameInstance, MAX_PLAYERS, Runtime, RuntimeConfig, SyncTestReport, TickInputs, WasmEngine,
};

use crate::commands::AudioCommand;
use crate::config::HostConfig;
use crate::device::DeviceRegion;
use crate::ffi::create_linker;
use crate::input::KilnInput;
use crate::state::KilnFfiState;

/// Outcome of a headless run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub handles: usize,
    pub keyframe_collections: usize,
    /// (region, used, budget) in bytes
    pub device_usage: Vec<(DeviceRegion, usize, usize)>,
    pub tick_rate: u32,
    pub report: SyncTestReport,
    /// Digest of the immutable partition recorded at seal
    pub fingerprint: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "handles: {} ({} keyframe collections)",
            self.handles, self.keyframe_collections
        )?;
        for (region, used, budget) in &self.device_usage {
            writeln!(f, "{:>16}: {} / {} bytes", region.name(), used, budget)?;
        }
        writeln!(f, "tick rate: {} Hz", self.tick_rate)?;
        writeln!(
            f,
            "ticks: {} ({} rollback checks)",
            self.report.ticks, self.report.checks
        )?;
        writeln!(f, "checksum: {:#018x}", self.report.final_checksum)?;
        write!(f, "fingerprint: {:#018x}", self.fingerprint)
    }
}

/// A game instantiated and initialized for headless execution
pub struct HeadlessRunner {
    runtime: Runtime<KilnInput, KilnFfiState>,
    seed: u64,
}

impl HeadlessRunner {
    /// Instantiate `wasm` and run its `init()`
    pub fn new(
        engine: &WasmEngine,
        wasm: &[u8],
        archive: Option<Arc<ArchivePack>>,
        config: &HostConfig,
    ) -> Result<Self> {
        let module = engine.load_module(wasm)?;
        let linker = create_linker(engine)?;
        let ram_limit = config.memory.ram_limit;
        let mut game = GameInstance::with_ram_limit(engine, &module, &linker, ram_limit)?;

        *game.console_state_mut() = KilnFfiState::from_config(config, archive);
        let players = config.session.player_count;
        game.configure_session(players, (1u32 << players.min(MAX_PLAYERS as u32)) - 1);
        game.state_mut().seed_rng(config.session.seed);

        let runtime_config = RuntimeConfig {
            check_distance: config.rollback.check_distance,
            ..RuntimeConfig::default()
        };
        let mut runtime = Runtime::new(runtime_config, game, ram_limit);
        runtime.init_game().context("game init() failed")?;

        let tick_rate = runtime.game().console_state().init_config.tick_rate();
        runtime.set_tick_rate(tick_rate);
        tracing::info!(
            "game initialized: {} assets, {} Hz",
            runtime.game().console_state().registry.len(),
            tick_rate
        );

        Ok(Self {
            runtime,
            seed: config.session.seed,
        })
    }

    /// Run `ticks` ticks, then verify the immutable partition
    pub fn run(&mut self, ticks: u64) -> Result<RunSummary> {
        let seed = self.seed;
        let report = self.runtime.run_sync_test(
            ticks,
            |tick| seeded_inputs(seed, tick),
            observe_commands,
        )?;

        let state = self.runtime.game().console_state();
        state
            .verify_partition()
            .context("immutable state changed during the run")?;
        let fingerprint = state
            .fingerprint()
            .map(|f| f.digest())
            .context("console state was never sealed")?;

        let device = state.store.device();
        Ok(RunSummary {
            handles: state.registry.len(),
            keyframe_collections: state.keyframes.len(),
            device_usage: DeviceRegion::ALL
                .iter()
                .map(|&region| (region, device.used(region), device.budget(region)))
                .collect(),
            tick_rate: self.runtime.tick_rate(),
            report,
            fingerprint,
        })
    }

    pub fn game(&self) -> &GameInstance<KilnInput, KilnFfiState> {
        self.runtime.game()
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime<KilnInput, KilnFfiState> {
        &mut self.runtime
    }
}

/// Inputs derived from the session seed and the tick number only
pub fn seeded_inputs(seed: u64, tick: u64) -> TickInputs<KilnInput> {
    std::array::from_fn(|player| {
        let bits = xxh3_64_with_seed(&tick.to_le_bytes(), seed ^ player as u64);
        KilnInput {
            buttons: bits as u16 & 0x0FFF,
            left_x: (bits >> 16) as i8,
            left_y: (bits >> 24) as i8,
        }
    })
}

/// Digest this tick's draw commands and queued audio, then hand the audio off
fn observe_commands(game: &mut GameInstance<KilnInput, KilnFfiState>) -> u64 {
    let commands = &mut game.console_state_mut().commands;
    let digest = commands.digest();
    for AudioCommand::PlaySound { sound, volume, pan } in commands.drain_audio() {
        tracing::trace!("play {} (volume {}, pan {})", sound, volume, pan);
    }
    digest
}
