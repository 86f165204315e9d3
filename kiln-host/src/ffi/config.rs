//! Configuration FFI functions (init-only, single-call)
//!
//! Calling one of these after the first update/render, calling it twice or
//! passing an out-of-range value traps the guest.

use anyhow::{Result, bail};
use wasmtime::{Caller, Linker};

use kiln_common::console::RENDER_MODE_COUNT;
use kiln_common::{RESOLUTIONS, TICK_RATES};

use super::KilnGameContext;
use super::guards::check_init_phase;

/// Register configuration FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "set_resolution", set_resolution)?;
    linker.func_wrap("env", "set_tick_rate", set_tick_rate)?;
    linker.func_wrap("env", "set_clear_color", set_clear_color)?;
    linker.func_wrap("env", "render_mode", render_mode)?;
    Ok(())
}

fn already_set(operation: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "{operation}() called twice - each config function can only be called once during init()"
    )
}

/// Set the render resolution by index into `RESOLUTIONS`
fn set_resolution(mut caller: Caller<'_, KilnGameContext>, index: u32) -> Result<()> {
    check_init_phase(&caller, "set_resolution")?;
    let config = &mut caller.data_mut().ffi.init_config;
    if config.resolution_set {
        return Err(already_set("set_resolution"));
    }
    if index as usize >= RESOLUTIONS.len() {
        bail!(
            "set_resolution({}) invalid - must be 0-{}",
            index,
            RESOLUTIONS.len() - 1
        );
    }
    config.resolution_set = true;
    config.resolution_index = index;
    Ok(())
}

/// Set the tick rate
///
/// Valid indices: 0=24, 1=30, 2=60 (default), 3=120
fn set_tick_rate(mut caller: Caller<'_, KilnGameContext>, index: u32) -> Result<()> {
    check_init_phase(&caller, "set_tick_rate")?;
    let config = &mut caller.data_mut().ffi.init_config;
    if config.tick_rate_set {
        return Err(already_set("set_tick_rate"));
    }
    if index as usize >= TICK_RATES.len() {
        bail!(
            "set_tick_rate({}) invalid - must be 0-{}",
            index,
            TICK_RATES.len() - 1
        );
    }
    config.tick_rate_set = true;
    config.tick_rate_index = index;
    Ok(())
}

/// Set the clear color (0xRRGGBBAA)
fn set_clear_color(mut caller: Caller<'_, KilnGameContext>, color: u32) -> Result<()> {
    check_init_phase(&caller, "set_clear_color")?;
    let config = &mut caller.data_mut().ffi.init_config;
    if config.clear_color_set {
        return Err(already_set("set_clear_color"));
    }
    config.clear_color_set = true;
    config.clear_color = color;
    Ok(())
}

/// Set the render mode: 0=Unlit, 1=Matcap, 2=PBR, 3=Hybrid
fn render_mode(mut caller: Caller<'_, KilnGameContext>, mode: u32) -> Result<()> {
    check_init_phase(&caller, "render_mode")?;
    let config = &mut caller.data_mut().ffi.init_config;
    if config.render_mode_set {
        return Err(already_set("render_mode"));
    }
    if mode >= RENDER_MODE_COUNT {
        bail!(
            "render_mode({}) invalid - must be 0-{}",
            mode,
            RENDER_MODE_COUNT - 1
        );
    }
    config.render_mode_set = true;
    config.render_mode = mode as u8;
    Ok(())
}
