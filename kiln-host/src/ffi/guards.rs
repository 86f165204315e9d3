//! Lifecycle guards and guest memory helpers shared by the FFI modules

use std::ops::Range;

use anyhow::{Context, Result};
use wasmtime::{Caller, Memory};

use kiln_core::wasm::read_bytes_from_memory;

use super::KilnGameContext;
use crate::asset_store::AssetSource;
use crate::handle::Handle;
use crate::record::AssetKind;
use crate::state::KilnFfiState;

/// Fail with `NotInitPhase` once the registry is sealed
pub(crate) fn check_init_phase(
    caller: &Caller<'_, KilnGameContext>,
    operation: &'static str,
) -> Result<()> {
    caller.data().ffi.registry.assert_init_phase(operation)?;
    Ok(())
}

pub(crate) fn guest_memory(caller: &Caller<'_, KilnGameContext>) -> Option<Memory> {
    caller.data().game.memory
}

/// Byte range of a guest span, if it lies inside memory of `memory_len` bytes
pub(crate) fn guest_span(memory_len: usize, ptr: u32, len: usize) -> Option<Range<usize>> {
    let start = ptr as usize;
    let end = start.checked_add(len)?;
    (end <= memory_len).then_some(start..end)
}

/// Copy a guest span, trapping when it is out of bounds
pub(crate) fn read_guest_bytes(
    caller: &Caller<'_, KilnGameContext>,
    ptr: u32,
    len: u32,
    operation: &'static str,
) -> Result<Vec<u8>> {
    let memory = guest_memory(caller).with_context(|| format!("{operation}: no memory export"))?;
    read_bytes_from_memory(memory, caller, ptr, len).with_context(|| format!("{operation}: bad span"))
}

/// Read an archive id string
pub(crate) fn read_asset_id(
    caller: &Caller<'_, KilnGameContext>,
    ptr: u32,
    len: u32,
) -> Option<String> {
    let memory = guest_memory(caller)?;
    let data = memory.data(caller);
    let span = guest_span(data.len(), ptr, len as usize)?;
    String::from_utf8(data[span].to_vec()).ok()
}

/// Load guest-supplied bytes in place; every failure traps
pub(crate) fn load_from_guest(
    caller: &mut Caller<'_, KilnGameContext>,
    kind: AssetKind,
    ptr: u32,
    len: usize,
    operation: &'static str,
) -> Result<u32> {
    check_init_phase(caller, operation)?;
    let memory = guest_memory(caller).with_context(|| format!("{operation}: no memory export"))?;
    let (data, ctx) = memory.data_and_store_mut(&mut *caller);
    let span = guest_span(data.len(), ptr, len).with_context(|| {
        format!(
            "{operation}: span {ptr:#x}+{len} out of bounds (memory size {})",
            data.len()
        )
    })?;
    let handle = ctx
        .ffi
        .load_asset(kind, AssetSource::Bytes(&data[span]))
        .with_context(|| format!("{operation} failed"))?;
    Ok(handle.to_raw())
}

/// Load composed bytes; every failure traps
pub(crate) fn load_bytes(
    caller: &mut Caller<'_, KilnGameContext>,
    kind: AssetKind,
    bytes: &[u8],
    operation: &'static str,
) -> Result<u32> {
    let handle = caller
        .data_mut()
        .ffi
        .load_asset(kind, AssetSource::Bytes(bytes))
        .with_context(|| format!("{operation} failed"))?;
    Ok(handle.to_raw())
}

/// Load an archive entry by id
///
/// A missing entry returns 0 and is deferred so startup aborts at seal.
/// Every other failure traps.
pub(crate) fn load_from_archive(
    caller: &mut Caller<'_, KilnGameContext>,
    kind: AssetKind,
    id_ptr: u32,
    id_len: u32,
    operation: &'static str,
) -> Result<u32> {
    check_init_phase(caller, operation)?;
    let id = read_asset_id(caller, id_ptr, id_len).with_context(|| {
        format!("{operation}: failed to read asset id at {id_ptr:#010x}, len {id_len}")
    })?;
    let state = &mut caller.data_mut().ffi;
    match state.load_asset(kind, AssetSource::Archive(&id)) {
        Ok(handle) => Ok(handle.to_raw()),
        Err(e) if e.is_deferred() => {
            state.defer_failure(e);
            Ok(0)
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("{operation}('{id}') failed"))),
    }
}

/// Resolve a render-path handle; 0 and invalid handles warn and yield `None`
pub(crate) fn resolve_or_warn(
    state: &KilnFfiState,
    raw: u32,
    kind: AssetKind,
    operation: &str,
) -> Option<Handle> {
    match state.registry.resolve_kind(raw, kind) {
        Ok((handle, _)) => Some(handle),
        Err(e) => {
            tracing::warn!("{}: {}", operation, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::guest_span;

    #[test]
    fn test_guest_span_bounds() {
        assert_eq!(guest_span(100, 10, 20), Some(10..30));
        assert_eq!(guest_span(100, 90, 10), Some(90..100));
        assert_eq!(guest_span(100, 90, 11), None);
        assert_eq!(guest_span(100, u32::MAX, usize::MAX), None);
    }
}
