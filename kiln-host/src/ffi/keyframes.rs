//! Keyframe animation FFI functions
//!
//! Collections are decoded once at load into the device keyframe region.
//! `keyframe_bind` only moves an offset register; `keyframe_read` copies one
//! decoded frame into guest memory for CPU-side blending.

use anyhow::Result;
use tracing::warn;
use wasmtime::{Caller, Linker};

use super::KilnGameContext;
use super::guards::{guest_memory, guest_span, load_from_archive, load_from_guest};
use crate::record::AssetKind;

/// Register keyframe FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "keyframes_load", keyframes_load)?;
    linker.func_wrap("env", "rom_keyframes", rom_keyframes)?;
    linker.func_wrap("env", "keyframes_bone_count", keyframes_bone_count)?;
    linker.func_wrap("env", "keyframes_frame_count", keyframes_frame_count)?;
    linker.func_wrap("env", "keyframe_bind", keyframe_bind)?;
    linker.func_wrap("env", "keyframe_read", keyframe_read)?;
    Ok(())
}

/// Load a keyframe block (4-byte header + packed bone keyframes)
///
/// **Init-only.** Traps on any failure.
fn keyframes_load(mut caller: Caller<'_, KilnGameContext>, ptr: u32, len: u32) -> Result<u32> {
    load_from_guest(
        &mut caller,
        AssetKind::Keyframes,
        ptr,
        len as usize,
        "keyframes_load",
    )
}

/// Load a keyframe collection from the archive by id
///
/// Returns 0 if the id is unknown; startup then aborts before the first
/// update. **Init-only.**
fn rom_keyframes(mut caller: Caller<'_, KilnGameContext>, id_ptr: u32, id_len: u32) -> Result<u32> {
    load_from_archive(
        &mut caller,
        AssetKind::Keyframes,
        id_ptr,
        id_len,
        "rom_keyframes",
    )
}

fn keyframes_bone_count(caller: Caller<'_, KilnGameContext>, handle: u32) -> u32 {
    caller.data().ffi.keyframes.bone_count(handle)
}

fn keyframes_frame_count(caller: Caller<'_, KilnGameContext>, handle: u32) -> u32 {
    caller.data().ffi.keyframes.frame_count(handle)
}

/// Point skinned draws at a frame; frames wrap modulo the frame count
fn keyframe_bind(mut caller: Caller<'_, KilnGameContext>, handle: u32, frame: u32) {
    let state = &mut caller.data_mut().ffi;
    state.keyframes.bind(&mut state.bound, handle, frame);
}

/// Copy one frame (bone_count × 48 bytes, row-major f32) into guest memory
///
/// Returns bytes written, or 0 without writing anything on an invalid
/// handle, an out-of-bounds span or a buffer shorter than one frame.
fn keyframe_read(
    mut caller: Caller<'_, KilnGameContext>,
    handle: u32,
    frame: u32,
    out_ptr: u32,
    out_len: u32,
) -> u32 {
    let Some(memory) = guest_memory(&caller) else {
        warn!("keyframe_read: no memory export");
        return 0;
    };
    let (data, ctx) = memory.data_and_store_mut(&mut caller);
    let Some(span) = guest_span(data.len(), out_ptr, out_len as usize) else {
        warn!(
            "keyframe_read: output span {:#x}+{} out of bounds (memory size {})",
            out_ptr,
            out_len,
            data.len()
        );
        return 0;
    };
    let state = &ctx.ffi;
    match state.keyframes.read(&state.store, handle, frame, &mut data[span]) {
        Ok(written) => written as u32,
        Err(e) => {
            warn!("keyframe_read: {}", e);
            0
        }
    }
}
