//! Shared test helpers

use bytemuck::{Pod, Zeroable};

use crate::console::ConsoleInput;

/// Minimal POD input used by core tests
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, serde::Serialize, serde::Deserialize,
)]
pub struct TestInput {
    pub buttons: u16,
}

impl ConsoleInput for TestInput {
    fn buttons(&self) -> u32 {
        self.buttons as u32
    }
}
