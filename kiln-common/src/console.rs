//! Console constants

/// Supported render resolutions (16:9), selected by index in `set_resolution`
pub const RESOLUTIONS: &[(u32, u32)] = &[
    (640, 360),   // 360p
    (960, 540),   // 540p (default)
    (1280, 720),  // 720p
    (1920, 1080), // 1080p
];

/// Index into [`RESOLUTIONS`] used when the game never calls `set_resolution`
pub const DEFAULT_RESOLUTION: usize = 1;

/// Supported tick rates (updates per second), selected by index in `set_tick_rate`
pub const TICK_RATES: &[u32] = &[24, 30, 60, 120];

/// Index into [`TICK_RATES`] used when the game never calls `set_tick_rate`
pub const DEFAULT_TICK_RATE: usize = 2;

/// Maximum bones per skeleton, keyframe collection or immediate upload
pub const MAX_BONES: usize = 256;

/// Number of render modes accepted by `render_mode`
pub const RENDER_MODE_COUNT: u32 = 4;
