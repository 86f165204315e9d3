//! Rollback state management
//!
//! Provides state snapshot and buffer pool functionality for rollback.

use smallvec::SmallVec;

mod host_state;
mod manager;
mod pool;
mod snapshot;

pub use host_state::{HOST_STATE_SIZE, HostRollbackState};
pub use manager::{LoadStateError, RollbackStateManager, SaveStateError};
pub use pool::StatePool;
pub use snapshot::GameStateSnapshot;

/// Inline storage for input state (avoids heap allocation)
/// 128 bytes covers a 4-byte input ×4 players ×2 (prev+curr) with room to spare
pub type InputDataVec = SmallVec<[u8; 128]>;
