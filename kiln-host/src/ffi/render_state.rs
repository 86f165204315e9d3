//! Render state FFI functions
//!
//! Each call sets one bound-state register. Out-of-range values warn and
//! fall back to the register default.

use anyhow::Result;
use tracing::warn;
use wasmtime::{Caller, Linker};

use super::KilnGameContext;
use crate::bound_state::{BlendMode, CullMode, TextureFilter};

/// Register render state FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "set_color", set_color)?;
    linker.func_wrap("env", "depth_test", depth_test)?;
    linker.func_wrap("env", "cull_mode", cull_mode)?;
    linker.func_wrap("env", "blend_mode", blend_mode)?;
    linker.func_wrap("env", "texture_filter", texture_filter)?;
    linker.func_wrap("env", "uniform_alpha", uniform_alpha)?;
    linker.func_wrap("env", "dither_offset", dither_offset)?;
    Ok(())
}

/// Set the uniform tint color (0xRRGGBBAA)
fn set_color(mut caller: Caller<'_, KilnGameContext>, color: u32) {
    caller.data_mut().ffi.bound.color = color;
}

/// Enable (non-zero) or disable depth testing
fn depth_test(mut caller: Caller<'_, KilnGameContext>, enabled: u32) {
    caller.data_mut().ffi.bound.depth_test = enabled != 0;
}

/// 0=none, 1=back, 2=front
fn cull_mode(mut caller: Caller<'_, KilnGameContext>, mode: u32) {
    let mode = CullMode::from_u32(mode).unwrap_or_else(|| {
        warn!("cull_mode({}) invalid - must be 0-2, using none", mode);
        CullMode::None
    });
    caller.data_mut().ffi.bound.cull_mode = mode;
}

/// 0=none, 1=alpha, 2=additive, 3=multiply
fn blend_mode(mut caller: Caller<'_, KilnGameContext>, mode: u32) {
    let mode = BlendMode::from_u32(mode).unwrap_or_else(|| {
        warn!("blend_mode({}) invalid - must be 0-3, using none", mode);
        BlendMode::None
    });
    caller.data_mut().ffi.bound.blend_mode = mode;
}

/// 0=nearest, 1=linear
fn texture_filter(mut caller: Caller<'_, KilnGameContext>, filter: u32) {
    let filter = TextureFilter::from_u32(filter).unwrap_or_else(|| {
        warn!("texture_filter({}) invalid - must be 0-1, using nearest", filter);
        TextureFilter::Nearest
    });
    caller.data_mut().ffi.bound.texture_filter = filter;
}

/// Dither transparency level, 0 (invisible) to 15 (opaque)
fn uniform_alpha(mut caller: Caller<'_, KilnGameContext>, level: u32) {
    caller.data_mut().ffi.bound.uniform_alpha = level.min(15) as u8;
}

/// Screen-space dither pattern offset, each axis 0-3
fn dither_offset(mut caller: Caller<'_, KilnGameContext>, x: u32, y: u32) {
    caller.data_mut().ffi.bound.dither_offset = (x.min(3) as u8, y.min(3) as u8);
}
