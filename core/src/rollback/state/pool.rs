//! Pre-allocated snapshot buffers

/// Pool of reusable state buffers
///
/// Saving a snapshot every tick would otherwise allocate a full copy of
/// guest memory each time. Buffers are handed out with at least
/// `buffer_capacity` bytes reserved and come back through [`StatePool::release`].
pub struct StatePool {
    buffers: Vec<Vec<u8>>,
    buffer_capacity: usize,
}

impl StatePool {
    /// Create a pool holding `count` buffers of `buffer_capacity` bytes each
    pub fn new(buffer_capacity: usize, count: usize) -> Self {
        let buffers = (0..count)
            .map(|_| Vec::with_capacity(buffer_capacity))
            .collect();
        Self {
            buffers,
            buffer_capacity,
        }
    }

    /// Take a cleared buffer, allocating a fresh one if the pool is empty
    pub fn acquire(&mut self) -> Vec<u8> {
        match self.buffers.pop() {
            Some(mut buffer) => {
                buffer.clear();
                buffer
            }
            None => {
                tracing::trace!("state pool exhausted, allocating");
                Vec::with_capacity(self.buffer_capacity)
            }
        }
    }

    /// Return a buffer to the pool
    pub fn release(&mut self, buffer: Vec<u8>) {
        self.buffers.push(buffer);
    }

    /// Number of buffers ready to hand out
    pub fn available(&self) -> usize {
        self.buffers.len()
    }
}
