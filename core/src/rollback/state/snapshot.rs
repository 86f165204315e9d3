//! Game state snapshot for rollback

use smallvec::SmallVec;
use xxhash_rust::xxh3::Xxh3;

use super::InputDataVec;
use super::host_state::{HOST_STATE_SIZE, HostRollbackState};

/// Snapshot of the snapshotted state partition
///
/// Contains the whole WASM linear memory, the host sidecar, the input
/// registers and a checksum over all three for desync detection.
#[derive(Clone)]
pub struct GameStateSnapshot {
    /// Entire WASM linear memory
    pub data: Vec<u8>,
    /// Input state (input_prev + input_curr) serialized via bytemuck
    /// Required for button_pressed() to work correctly after rollback
    pub input_data: InputDataVec,
    /// Host-side state (RNG, tick count, elapsed time)
    pub host_state: HostRollbackState,
    /// xxHash3 checksum covering all state
    pub checksum: u64,
    /// Frame number this snapshot was taken at
    pub frame: i32,
}

impl GameStateSnapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            input_data: SmallVec::new(),
            host_state: HostRollbackState::default(),
            checksum: 0,
            frame: -1,
        }
    }

    /// Create a snapshot from guest memory alone (no input or host data)
    pub fn from_data(data: Vec<u8>, frame: i32) -> Self {
        Self::from_full_state(data, SmallVec::new(), HostRollbackState::default(), frame)
    }

    /// Create a complete snapshot with all rollback state
    pub fn from_full_state(
        data: Vec<u8>,
        input_data: InputDataVec,
        host_state: HostRollbackState,
        frame: i32,
    ) -> Self {
        let checksum = Self::compute_checksum(&data, &input_data, &host_state);
        Self {
            data,
            input_data,
            host_state,
            checksum,
            frame,
        }
    }

    /// Check if this snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the saved guest memory in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Total snapshot size including input and host state
    pub fn total_len(&self) -> usize {
        self.data.len() + self.input_data.len() + HOST_STATE_SIZE
    }

    fn compute_checksum(data: &[u8], input_data: &[u8], host_state: &HostRollbackState) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(data);
        hasher.update(input_data);
        hasher.update(bytemuck::bytes_of(host_state));
        hasher.digest()
    }
}

impl Default for GameStateSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
