//! Game loop orchestration
//!
//! Drives a [`GameInstance`] with a fixed timestep: every tick is one
//! `update()` followed by one `render()`. Optionally verifies determinism by
//! rolling back and replaying every `check_distance` ticks.

use std::time::Duration;

use anyhow::Result;

use crate::console::{ConsoleFfiState, ConsoleInput};
use crate::rollback::{GameStateSnapshot, RollbackStateManager};
use crate::wasm::{GameInstance, MAX_PLAYERS};

mod config;


pub use config::RuntimeConfig;
pub use sync_test::{DesyncError, SyncTestReport};

/// Inputs for every player slot on one tick
pub type TickInputs<I> = [I; MAX_PLAYERS];

/// Main runtime managing game execution
pub struct Runtime<I: ConsoleInput, S: ConsoleFfiState> {
    config: RuntimeConfig,
    game: GameInstance<I, S>,
    rollback: RollbackStateManager,
    accumulator: Duration,
    tick_duration: Duration,
}

impl<I: ConsoleInput, S: ConsoleFfiState> Runtime<I, S> {
    /// Create a runtime around an instantiated game
    ///
    /// `max_state_size` bounds the guest memory a rollback snapshot may hold
    /// and should match the RAM limit the game was instantiated with.
    pub fn new(config: RuntimeConfig, game: GameInstance<I, S>, max_state_size: usize) -> Self {
        let tick_duration = config.tick_duration();
        Self {
            config,
            game,
            rollback: RollbackStateManager::new(max_state_size),
            accumulator: Duration::ZERO,
            tick_duration,
        }
    }

    /// Run the game's init()
    pub fn init_game(&mut self) -> Result<()> {
        self.game.init()
    }

    /// Set the tick rate
    pub fn set_tick_rate(&mut self, tick_rate: u32) {
        self.config.tick_rate = tick_rate;
        self.tick_duration = self.config.tick_duration();
    }

    /// Get the current tick rate
    pub fn tick_rate(&self) -> u32 {
        self.config.tick_rate
    }

    /// Get the tick duration (time per tick, inverse of tick rate)
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Get the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run exactly one tick: update with `inputs`, then render
    pub fn tick(&mut self, inputs: &TickInputs<I>) -> Result<()> {
        for (player, input) in inputs.iter().enumerate() {
            self.game.set_input(player, *input);
        }
        self.game.update(self.tick_duration.as_secs_f32())?;
        self.game.render()
    }

    /// Advance by a wall-clock delta, running as many fixed ticks as fit
    ///
    /// Returns the number of ticks executed.
    pub fn frame(&mut self, elapsed: Duration, inputs: &TickInputs<I>) -> Result<u32> {
        self.accumulator += elapsed.min(self.config.max_delta);
        let mut ticks = 0;
        while self.accumulator >= self.tick_duration {
            self.tick(inputs)?;
            self.accumulator -= self.tick_duration;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Snapshot the rollback partition
    pub fn save_snapshot(&mut self, frame: i32) -> Result<GameStateSnapshot> {
        Ok(self.rollback.save_state(&mut self.game, frame)?)
    }

    /// Restore the rollback partition from a snapshot
    pub fn load_snapshot(&mut self, snapshot: &GameStateSnapshot) -> Result<()> {
        Ok(self.rollback.load_state(&mut self.game, snapshot)?)
    }

    /// Return a snapshot's buffer to the pool
    pub fn recycle_snapshot(&mut self, snapshot: GameStateSnapshot) {
        self.rollback.recycle_snapshot(snapshot);
    }

    /// Get a reference to the game
    pub fn game(&self) -> &GameInstance<I, S> {
        &self.game
    }

    /// Get a mutable reference to the game
    pub fn game_mut(&mut self) -> &mut GameInstance<I, S> {
        &mut self.game
    }

    /// Consume the runtime, returning the game
    pub fn into_game(self) -> GameInstance<I, S> {
        self.game
    }
}
