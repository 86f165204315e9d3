//! Archive FFI functions
//!
//! `rom_*` loads are init-only. An unknown id returns 0 and aborts startup at
//! the first update. Raw data never gets a device upload: `rom_data` copies
//! it into guest memory on request, at any time.

use anyhow::Result;
use tracing::warn;
use wasmtime::{Caller, Linker};

use super::KilnGameContext;
use super::guards::{guest_memory, guest_span, load_from_archive, read_asset_id};
use crate::record::AssetKind;

/// Register archive FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "rom_texture", rom_texture)?;
    linker.func_wrap("env", "rom_mesh", rom_mesh)?;
    linker.func_wrap("env", "rom_skeleton", rom_skeleton)?;
    linker.func_wrap("env", "rom_font", rom_font)?;
    linker.func_wrap("env", "rom_sound", rom_sound)?;
    linker.func_wrap("env", "rom_data_len", rom_data_len)?;
    linker.func_wrap("env", "rom_data", rom_data)?;
    Ok(())
}

fn rom_texture(mut caller: Caller<'_, KilnGameContext>, id_ptr: u32, id_len: u32) -> Result<u32> {
    load_from_archive(&mut caller, AssetKind::Texture, id_ptr, id_len, "rom_texture")
}

fn rom_mesh(mut caller: Caller<'_, KilnGameContext>, id_ptr: u32, id_len: u32) -> Result<u32> {
    load_from_archive(&mut caller, AssetKind::Mesh, id_ptr, id_len, "rom_mesh")
}

fn rom_skeleton(mut caller: Caller<'_, KilnGameContext>, id_ptr: u32, id_len: u32) -> Result<u32> {
    load_from_archive(&mut caller, AssetKind::Skeleton, id_ptr, id_len, "rom_skeleton")
}

fn rom_font(mut caller: Caller<'_, KilnGameContext>, id_ptr: u32, id_len: u32) -> Result<u32> {
    load_from_archive(&mut caller, AssetKind::Font, id_ptr, id_len, "rom_font")
}

fn rom_sound(mut caller: Caller<'_, KilnGameContext>, id_ptr: u32, id_len: u32) -> Result<u32> {
    load_from_archive(&mut caller, AssetKind::Sound, id_ptr, id_len, "rom_sound")
}

/// Size in bytes of a raw data entry, 0 if unknown
fn rom_data_len(caller: Caller<'_, KilnGameContext>, id_ptr: u32, id_len: u32) -> u32 {
    let Some(id) = read_asset_id(&caller, id_ptr, id_len) else {
        warn!("rom_data_len: failed to read asset id");
        return 0;
    };
    match caller.data().ffi.store.raw_data_len(&id) {
        Ok(len) => len,
        Err(e) => {
            warn!("rom_data_len: {}", e);
            0
        }
    }
}

/// Copy a raw data entry into `dst_ptr`, all or nothing
///
/// Returns bytes written. Returns 0 and writes nothing when the id is
/// unknown, the span is out of bounds or `max_len` is smaller than the entry.
fn rom_data(
    mut caller: Caller<'_, KilnGameContext>,
    id_ptr: u32,
    id_len: u32,
    dst_ptr: u32,
    max_len: u32,
) -> u32 {
    let Some(id) = read_asset_id(&caller, id_ptr, id_len) else {
        warn!("rom_data: failed to read asset id");
        return 0;
    };
    let Some(memory) = guest_memory(&caller) else {
        warn!("rom_data: no memory export");
        return 0;
    };
    let (data, ctx) = memory.data_and_store_mut(&mut caller);
    let Some(span) = guest_span(data.len(), dst_ptr, max_len as usize) else {
        warn!(
            "rom_data: destination {:#x}+{} out of bounds (memory size {})",
            dst_ptr,
            max_len,
            data.len()
        );
        return 0;
    };
    match ctx.ffi.store.copy_raw_data(&id, &mut data[span]) {
        Ok(written) => written as u32,
        Err(e) => {
            warn!("rom_data('{}'): {}", id, e);
            0
        }
    }
}
