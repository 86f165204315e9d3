//! Init-time console configuration
//!
//! Every config function is init-only and single-call: calling one after the
//! first update/render, calling it twice, or passing an out-of-range value
//! traps the guest.

use kiln_common::{DEFAULT_RESOLUTION, DEFAULT_TICK_RATE, RESOLUTIONS, TICK_RATES};
use xxhash_rust::xxh3::Xxh3;

/// Configuration chosen by the game during `init()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitConfig {
    /// Index into [`RESOLUTIONS`]
    pub resolution_index: u32,
    /// Index into [`TICK_RATES`]
    pub tick_rate_index: u32,
    /// 0xRRGGBBAA
    pub clear_color: u32,
    /// 0-3: Unlit, Matcap, PBR, Hybrid
    pub render_mode: u8,

    // Duplicate call tracking
    pub resolution_set: bool,
    pub tick_rate_set: bool,
    pub clear_color_set: bool,
    pub render_mode_set: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            resolution_index: DEFAULT_RESOLUTION as u32,
            tick_rate_index: DEFAULT_TICK_RATE as u32,
            clear_color: 0x000000FF,
            render_mode: 0,
            resolution_set: false,
            tick_rate_set: false,
            clear_color_set: false,
            render_mode_set: false,
        }
    }
}

impl InitConfig {
    /// Ticks per second
    pub fn tick_rate(&self) -> u32 {
        TICK_RATES[self.tick_rate_index as usize]
    }

    /// Render target size in pixels
    pub fn resolution(&self) -> (u32, u32) {
        RESOLUTIONS[self.resolution_index as usize]
    }

    pub(crate) fn hash_into(&self, hasher: &mut Xxh3) {
        hasher.update(&self.resolution_index.to_le_bytes());
        hasher.update(&self.tick_rate_index.to_le_bytes());
        hasher.update(&self.clear_color.to_le_bytes());
        hasher.update(&[self.render_mode]);
    }
}
