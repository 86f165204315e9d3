//! Kiln controller input

use bytemuck::{Pod, Zeroable};
use kiln_core::ConsoleInput;
use serde::{Deserialize, Serialize};

/// Button bit indices for [`KilnInput::buttons`]
pub mod button {
    pub const UP: u32 = 0;
    pub const DOWN: u32 = 1;
    pub const LEFT: u32 = 2;
    pub const RIGHT: u32 = 3;
    pub const A: u32 = 4;
    pub const B: u32 = 5;
    pub const X: u32 = 6;
    pub const Y: u32 = 7;
    pub const L: u32 = 8;
    pub const R: u32 = 9;
    pub const START: u32 = 10;
    pub const SELECT: u32 = 11;
}

/// Per-player input registers (4 bytes, POD for rollback snapshots)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct KilnInput {
    /// Bit N set = button N held
    pub buttons: u16,
    /// Left stick, -128..=127
    pub left_x: i8,
    pub left_y: i8,
}

impl ConsoleInput for KilnInput {
    fn buttons(&self) -> u32 {
        self.buttons as u32
    }
}

impl KilnInput {
    pub fn with_buttons(buttons: u16) -> Self {
        Self {
            buttons,
            ..Self::default()
        }
    }
}
