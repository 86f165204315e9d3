//! Skeleton and immediate bone FFI functions
//!
//! `set_bones` takes row-major 3×4 matrices, the layout `keyframe_read`
//! produces, so CPU-blended frames can be handed straight back.
//! `set_bones_4x4` takes column-major 4×4 matrices and drops the last row.

use anyhow::{Context, Result};
use glam::Mat4;
use tracing::warn;
use wasmtime::{Caller, Linker};

use kiln_common::{BoneMatrix3x4, MAX_BONES, SkeletonHeader};

use super::KilnGameContext;
use super::guards::{
    check_init_phase, guest_memory, guest_span, load_bytes, read_guest_bytes, resolve_or_warn,
};
use crate::bound_state::KeyframeSource;
use crate::record::AssetKind;

/// Register skinning FFI functions
pub fn register(linker: &mut Linker<KilnGameContext>) -> Result<()> {
    linker.func_wrap("env", "load_skeleton", load_skeleton)?;
    linker.func_wrap("env", "skeleton_bind", skeleton_bind)?;
    linker.func_wrap("env", "set_bones", set_bones)?;
    linker.func_wrap("env", "set_bones_4x4", set_bones_4x4)?;
    Ok(())
}

/// Load inverse bind matrices (12 column-major floats per bone)
///
/// **Init-only.** Traps on any failure.
fn load_skeleton(
    mut caller: Caller<'_, KilnGameContext>,
    ptr: u32,
    bone_count: u32,
) -> Result<u32> {
    check_init_phase(&caller, "load_skeleton")?;
    let len = bone_count
        .checked_mul(BoneMatrix3x4::SIZE as u32)
        .context("load_skeleton: bone_count overflows")?;
    let matrices = read_guest_bytes(&caller, ptr, len, "load_skeleton")?;

    let mut bytes = Vec::with_capacity(SkeletonHeader::SIZE + matrices.len());
    bytes.extend_from_slice(&SkeletonHeader::new(bone_count).to_bytes());
    bytes.extend_from_slice(&matrices);
    load_bytes(&mut caller, AssetKind::Skeleton, &bytes, "load_skeleton")
}

/// Bind a skeleton for subsequent skinned draws; 0 unbinds
fn skeleton_bind(mut caller: Caller<'_, KilnGameContext>, handle: u32) {
    let state = &mut caller.data_mut().ffi;
    if handle == 0 {
        state.bound.skeleton = None;
        return;
    }
    if let Some(skeleton) = resolve_or_warn(state, handle, AssetKind::Skeleton, "skeleton_bind") {
        state.bound.skeleton = Some(skeleton);
    }
}

fn set_bones(caller: Caller<'_, KilnGameContext>, ptr: u32, count: u32) {
    set_immediate_bones(caller, ptr, count, 12, "set_bones", |floats| {
        let mut m = [0.0f32; 12];
        m.copy_from_slice(floats);
        BoneMatrix3x4::from_array(m)
    });
}

fn set_bones_4x4(caller: Caller<'_, KilnGameContext>, ptr: u32, count: u32) {
    set_immediate_bones(caller, ptr, count, 16, "set_bones_4x4", |floats| {
        let mut m = [0.0f32; 16];
        m.copy_from_slice(floats);
        BoneMatrix3x4::from_mat4(Mat4::from_cols_array(&m))
    });
}

/// Copy `count` guest matrices into the immediate bone registers
///
/// A count of 0 returns skinning to the static keyframe source.
fn set_immediate_bones(
    mut caller: Caller<'_, KilnGameContext>,
    ptr: u32,
    count: u32,
    floats_per_bone: usize,
    operation: &str,
    convert: impl Fn(&[f32]) -> BoneMatrix3x4,
) {
    if count as usize > MAX_BONES {
        warn!(
            "{}: bone count {} exceeds maximum {} - ignored",
            operation, count, MAX_BONES
        );
        return;
    }
    let Some(memory) = guest_memory(&caller) else {
        warn!("{}: no memory export", operation);
        return;
    };
    let (data, ctx) = memory.data_and_store_mut(&mut caller);
    let bound = &mut ctx.ffi.bound;
    if count == 0 {
        bound.immediate_bones.clear();
        bound.keyframe_source = KeyframeSource::Static { offset: 0 };
        bound.bone_count = 0;
        return;
    }

    let stride = floats_per_bone * 4;
    let Some(span) = guest_span(data.len(), ptr, count as usize * stride) else {
        warn!(
            "{}: span {:#x}+{} out of bounds (memory size {})",
            operation,
            ptr,
            count as usize * stride,
            data.len()
        );
        return;
    };

    let mut floats = [0.0f32; 16];
    bound.immediate_bones.clear();
    for chunk in data[span].chunks_exact(stride) {
        for (value, bytes) in floats.iter_mut().zip(chunk.chunks_exact(4)) {
            *value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
        bound
            .immediate_bones
            .push(convert(&floats[..floats_per_bone]));
    }
    bound.keyframe_source = KeyframeSource::Immediate { offset: 0 };
    bound.bone_count = count;
    tracing::trace!("{}: {} immediate bones", operation, count);
}
