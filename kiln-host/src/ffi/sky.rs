//! Procedural sky FFI functions

use anyhow::Result;
use glam::Vec3;
use tracing::warn;
use wasmtime::{Caller, Linker};

use super::KilnGameContext;

/// Register sky FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "sky_set_colors", sky_set_colors)?;
    linker.func_wrap("env", "sky_set_sun", sky_set_sun)?;
    linker.func_wrap("env", "draw_sky", draw_sky)?;
    Ok(())
}

/// Set the horizon and zenith gradient colors (0xRRGGBBAA)
fn sky_set_colors(mut caller: Caller<'_, KilnGameContext>, horizon: u32, zenith: u32) {
    let sky = &mut caller.data_mut().ffi.bound.sky;
    sky.horizon_color = horizon;
    sky.zenith_color = zenith;
}

/// Set the sun direction, color and sharpness
///
/// The direction is normalized. A zero-length direction falls back to
/// straight down. Sharpness is clamped to 0.0-1.0.
fn sky_set_sun(
    mut caller: Caller<'_, KilnGameContext>,
    dir_x: f32,
    dir_y: f32,
    dir_z: f32,
    color: u32,
    sharpness: f32,
) {
    let direction = Vec3::new(dir_x, dir_y, dir_z).try_normalize().unwrap_or_else(|| {
        warn!("sky_set_sun: zero-length direction, using (0, -1, 0)");
        Vec3::NEG_Y
    });
    let sky = &mut caller.data_mut().ffi.bound.sky;
    sky.sun_direction = direction.to_array();
    sky.sun_color = color;
    sky.sun_sharpness = if sharpness.is_nan() {
        0.0
    } else {
        sharpness.clamp(0.0, 1.0)
    };
}

/// Record a sky draw with the current sky registers
///
/// Sky draws always render with depth testing off; the bound depth register
/// is left alone.
fn draw_sky(mut caller: Caller<'_, KilnGameContext>) {
    let state = &mut caller.data_mut().ffi;
    state.commands.draw_sky(state.bound.sky);
}
