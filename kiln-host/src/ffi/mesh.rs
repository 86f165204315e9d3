//! Mesh FFI functions

use anyhow::Result;
use wasmtime::{Caller, Linker};

use super::KilnGameContext;
use super::guards::{load_from_guest, resolve_or_warn};
use crate::bound_state::KeyframeSource;
use crate::record::AssetKind;

/// Register mesh FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "load_mesh", load_mesh)?;
    linker.func_wrap("env", "draw_mesh", draw_mesh)?;
    Ok(())
}

/// Load a mesh in the documented layout (12-byte header, vertices, u16 indices)
///
/// **Init-only.** Traps on any failure.
fn load_mesh(mut caller: Caller<'_, KilnGameContext>, ptr: u32, byte_len: u32) -> Result<u32> {
    load_from_guest(
        &mut caller,
        AssetKind::Mesh,
        ptr,
        byte_len as usize,
        "load_mesh",
    )
}

/// Record a mesh draw with a snapshot of the bound registers
fn draw_mesh(mut caller: Caller<'_, KilnGameContext>, handle: u32) {
    let state = &mut caller.data_mut().ffi;
    let Some(mesh) = resolve_or_warn(state, handle, AssetKind::Mesh, "draw_mesh") else {
        return;
    };
    let immediate = match state.bound.keyframe_source {
        KeyframeSource::Immediate { .. } => state.bound.immediate_bones.as_slice(),
        KeyframeSource::Static { .. } => &[],
    };
    state
        .commands
        .draw_mesh(mesh, state.bound.draw_state(), immediate);
}
