//! Audio FFI functions

use anyhow::Result;
use wasmtime::{Caller, Linker};

use super::KilnGameContext;
use super::guards::{load_from_guest, resolve_or_warn};
use crate::record::AssetKind;

/// Register audio FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "load_sound", load_sound)?;
    linker.func_wrap("env", "play_sound", play_sound)?;
    Ok(())
}

/// Load a sound in the documented layout (8-byte header, i16 PCM samples)
///
/// **Init-only.** Traps on any failure.
fn load_sound(mut caller: Caller<'_, KilnGameContext>, ptr: u32, byte_len: u32) -> Result<u32> {
    load_from_guest(
        &mut caller,
        AssetKind::Sound,
        ptr,
        byte_len as usize,
        "load_sound",
    )
}

/// Queue a one-shot sound
///
/// Volume is clamped to 0.0-1.0 and pan to -1.0 (left) to 1.0 (right).
fn play_sound(mut caller: Caller<'_, KilnGameContext>, handle: u32, volume: f32, pan: f32) {
    let state = &mut caller.data_mut().ffi;
    let Some(sound) = resolve_or_warn(state, handle, AssetKind::Sound, "play_sound") else {
        return;
    };
    state
        .commands
        .play_sound(sound, clamp_or(volume, 0.0, 1.0, 1.0), clamp_or(pan, -1.0, 1.0, 0.0));
}

fn clamp_or(value: f32, min: f32, max: f32, nan: f32) -> f32 {
    if value.is_nan() {
        nan
    } else {
        value.clamp(min, max)
    }
}
