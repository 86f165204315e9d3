//! Texture FFI functions

use anyhow::{Context, Result};
use tracing::warn;
use wasmtime::{Caller, Linker};

use kiln_common::TextureHeader;

use super::KilnGameContext;
use super::guards::{check_init_phase, load_bytes, read_guest_bytes, resolve_or_warn};
use crate::record::AssetKind;

/// Register texture FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "load_texture", load_texture)?;
    linker.func_wrap("env", "texture_bind", texture_bind)?;
    linker.func_wrap("env", "matcap_set", matcap_set)?;
    Ok(())
}

/// Load an RGBA8 texture from WASM memory
///
/// Reads `width × height × 4` bytes at `ptr`. Returns a non-zero handle.
/// **Init-only.** Traps on any failure.
fn load_texture(
    mut caller: Caller<'_, KilnGameContext>,
    width: u32,
    height: u32,
    ptr: u32,
) -> Result<u32> {
    check_init_phase(&caller, "load_texture")?;
    let header = TextureHeader::new(
        u16::try_from(width).context("load_texture: width exceeds 65535")?,
        u16::try_from(height).context("load_texture: height exceeds 65535")?,
    );
    let size = u32::try_from(header.rgba8_size()).context("load_texture: texture too large")?;
    let pixels = read_guest_bytes(&caller, ptr, size, "load_texture")?;

    let mut bytes = Vec::with_capacity(TextureHeader::SIZE + pixels.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&pixels);
    load_bytes(&mut caller, AssetKind::Texture, &bytes, "load_texture")
}

/// Bind a texture to slot 0 (albedo); 0 unbinds
fn texture_bind(mut caller: Caller<'_, KilnGameContext>, handle: u32) {
    bind_slot(&mut caller, 0, handle, "texture_bind");
}

/// Bind a matcap texture to slot 1-3; 0 unbinds
fn matcap_set(mut caller: Caller<'_, KilnGameContext>, slot: u32, handle: u32) {
    if !(1..=3).contains(&slot) {
        warn!("matcap_set: slot {} invalid - must be 1-3", slot);
        return;
    }
    bind_slot(&mut caller, slot as usize, handle, "matcap_set");
}

fn bind_slot(caller: &mut Caller<'_, KilnGameContext>, slot: usize, raw: u32, operation: &str) {
    let state = &mut caller.data_mut().ffi;
    if raw == 0 {
        state.bound.textures[slot] = None;
        return;
    }
    if let Some(handle) = resolve_or_warn(state, raw, AssetKind::Texture, operation) {
        state.bound.textures[slot] = Some(handle);
    }
}
