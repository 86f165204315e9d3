//! Rollback snapshots
//!
//! Saves and restores the snapshotted state partition: guest linear memory,
//! the host sidecar (RNG, tick count, elapsed time) and the input registers.
//! Everything else a console owns is either immutable after init or rebuilt
//! every render, so it never enters a snapshot.
//!
//! # Module Structure
//!
//! - `state`: snapshot type, buffer pool and the save/load manager

mod state;

pub use state::{
    GameStateSnapshot, HOST_STATE_SIZE, HostRollbackState, InputDataVec, LoadStateError,
    RollbackStateManager, SaveStateError, StatePool,
};

/// Maximum rollback frames (how far a session may rewind)
pub const MAX_ROLLBACK_FRAMES: usize = 8;

/// Maximum state buffer size (16MB - full WASM linear memory snapshot)
pub const MAX_STATE_SIZE: usize = 16 * 1024 * 1024;

/// Number of pre-allocated state buffers in the pool
pub const STATE_POOL_SIZE: usize = MAX_ROLLBACK_FRAMES + 2;
