//! Rollback state manager: saves and loads the snapshotted partition

use smallvec::SmallVec;
use thiserror::Error;

use crate::console::{ConsoleFfiState, ConsoleInput};
use crate::rollback::{MAX_STATE_SIZE, STATE_POOL_SIZE};
use crate::wasm::{GameInstance, MAX_PLAYERS};

use super::InputDataVec;
use super::host_state::HostRollbackState;
use super::pool::StatePool;
use super::snapshot::GameStateSnapshot;

/// Manages game state saves and loads for rollback
///
/// Uses a `StatePool` so saving every tick reuses buffers instead of
/// allocating a copy of guest memory each time.
pub struct RollbackStateManager {
    pool: StatePool,
    /// Largest guest memory a snapshot may hold (the host's RAM limit)
    ///
    /// Input registers and the host sidecar are stored inline beside the
    /// memory copy and do not count against it.
    max_state_size: usize,
}

impl RollbackStateManager {
    /// Create a new rollback state manager with specified max state size
    pub fn new(max_state_size: usize) -> Self {
        Self {
            pool: StatePool::new(max_state_size, STATE_POOL_SIZE),
            max_state_size,
        }
    }

    /// Create a rollback state manager sized for [`MAX_STATE_SIZE`]
    ///
    /// Prefer `new(ram_limit)` to respect the host's memory configuration.
    pub fn with_defaults() -> Self {
        Self::new(MAX_STATE_SIZE)
    }

    /// Save the current game state
    ///
    /// Captures the whole WASM linear memory, the input registers (so
    /// button_pressed() keeps working after rollback) and the host sidecar.
    pub fn save_state<I: ConsoleInput, S: ConsoleFfiState>(
        &mut self,
        game: &mut GameInstance<I, S>,
        frame: i32,
    ) -> Result<GameStateSnapshot, SaveStateError> {
        let mut snapshot_data = self.pool.acquire();
        if let Err(e) = game.save_state_into(&mut snapshot_data) {
            self.pool.release(snapshot_data);
            return Err(SaveStateError::WasmError(format!("{:#}", e)));
        }

        let game_state = game.state();
        let mut input_data: InputDataVec = SmallVec::new();
        input_data.extend_from_slice(bytemuck::cast_slice(&game_state.input_prev));
        input_data.extend_from_slice(bytemuck::cast_slice(&game_state.input_curr));

        let host_state = HostRollbackState::capture(game_state);

        if snapshot_data.len() > self.max_state_size {
            let size = snapshot_data.len();
            self.pool.release(snapshot_data);
            return Err(SaveStateError::StateTooLarge {
                size,
                max: self.max_state_size,
            });
        }

        Ok(GameStateSnapshot::from_full_state(
            snapshot_data,
            input_data,
            host_state,
            frame,
        ))
    }

    /// Load a game state from a snapshot
    ///
    /// Restores guest memory, input registers and the host sidecar. An empty
    /// snapshot is a no-op.
    pub fn load_state<I: ConsoleInput, S: ConsoleFfiState>(
        &mut self,
        game: &mut GameInstance<I, S>,
        snapshot: &GameStateSnapshot,
    ) -> Result<(), LoadStateError> {
        if snapshot.is_empty() {
            return Ok(());
        }

        game.load_state(&snapshot.data)
            .map_err(|e| LoadStateError::WasmError(format!("{:#}", e)))?;

        // Input data layout: [input_prev ×MAX_PLAYERS][input_curr ×MAX_PLAYERS]
        if !snapshot.input_data.is_empty() {
            let half = std::mem::size_of::<I>() * MAX_PLAYERS;
            if snapshot.input_data.len() != half * 2 {
                return Err(LoadStateError::InputSizeMismatch {
                    expected: half * 2,
                    actual: snapshot.input_data.len(),
                });
            }
            let (prev_bytes, curr_bytes) = snapshot.input_data.split_at(half);
            let game_state = game.state_mut();
            for (dst, src) in game_state
                .input_prev
                .iter_mut()
                .zip(prev_bytes.chunks_exact(std::mem::size_of::<I>()))
            {
                *dst = bytemuck::pod_read_unaligned(src);
            }
            for (dst, src) in game_state
                .input_curr
                .iter_mut()
                .zip(curr_bytes.chunks_exact(std::mem::size_of::<I>()))
            {
                *dst = bytemuck::pod_read_unaligned(src);
            }
        }

        snapshot.host_state.restore(game.state_mut());

        Ok(())
    }

    /// Return a snapshot's buffer to the pool
    pub fn recycle_snapshot(&mut self, snapshot: GameStateSnapshot) {
        if snapshot.data.capacity() > 0 {
            self.pool.release(snapshot.data);
        }
    }

    /// Number of pooled buffers ready for the next save
    pub fn pooled_buffers(&self) -> usize {
        self.pool.available()
    }
}

impl Default for RollbackStateManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Error saving game state
#[derive(Debug, Clone, Error)]
pub enum SaveStateError {
    #[error("WASM error during save_state: {0}")]
    WasmError(String),
    #[error("Guest memory too large to snapshot: {size} bytes (max {max})")]
    StateTooLarge { size: usize, max: usize },
}

/// Error loading game state
#[derive(Debug, Clone, Error)]
pub enum LoadStateError {
    #[error("WASM error during load_state: {0}")]
    WasmError(String),
    #[error("Input state size mismatch: expected {expected} bytes, got {actual}")]
    InputSizeMismatch { expected: usize, actual: usize },
}
