//! Shared fixtures for host tests

use glam::{Quat, Vec3};
use kiln_common::formats::{MeshHeader, SkeletonHeader, TextureHeader, encode_sound};
use kiln_common::{ArchivePack, KeyframeBlockBuilder, PackedBoneKeyframe, PackedData, PackedKeyframes};

/// Keyframe builder whose bone `b` in frame `f` is translated to `(f, b, tag)`
pub fn keyframe_builder(bone_count: u8, frame_count: u16, tag: f32) -> KeyframeBlockBuilder {
    let mut builder = KeyframeBlockBuilder::new(bone_count);
    for f in 0..frame_count {
        let bones: Vec<_> = (0..bone_count)
            .map(|b| {
                PackedBoneKeyframe::encode(
                    Quat::IDENTITY,
                    Vec3::new(f as f32, b as f32, tag),
                    Vec3::ONE,
                )
            })
            .collect();
        builder.push_frame(&bones).unwrap();
    }
    builder
}

/// Header + frame data in the guest byte layout
pub fn keyframe_bytes(bone_count: u8, frame_count: u16, tag: f32) -> Vec<u8> {
    keyframe_builder(bone_count, frame_count, tag).to_bytes()
}

/// Archive entry built with [`keyframe_builder`]
pub fn packed_keyframes(id: &str, bone_count: u8, frame_count: u16, tag: f32) -> PackedKeyframes {
    let builder = keyframe_builder(bone_count, frame_count, tag);
    PackedKeyframes::new(id, bone_count, frame_count, builder.frame_data().to_vec())
}

/// Archive with 64-bone, 4-frame "walk" (tag 1) and "idle" (tag 2) clips
/// plus a 16-byte "level1" data blob
pub fn walk_idle_archive() -> ArchivePack {
    let mut pack = ArchivePack::new();
    pack.keyframes.push(packed_keyframes("walk", 64, 4, 1.0));
    pack.keyframes.push(packed_keyframes("idle", 64, 4, 2.0));
    pack.data
        .push(PackedData::new("level1", (0..16).collect()));
    pack
}

pub fn texture_bytes(width: u16, height: u16) -> Vec<u8> {
    let mut bytes = TextureHeader::new(width, height).to_bytes().to_vec();
    bytes.resize(TextureHeader::SIZE + width as usize * height as usize * 4, 0x80);
    bytes
}

/// Position-only triangle
pub fn triangle_mesh_bytes() -> Vec<u8> {
    let header = MeshHeader::new(3, 3, 0);
    let mut bytes = header.to_bytes().to_vec();
    bytes.resize(MeshHeader::SIZE + header.vertex_data_size(), 0);
    for i in [0u16, 1, 2] {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    bytes
}

/// Skeleton of identity inverse bind matrices (column-major on the wire)
pub fn skeleton_bytes(bone_count: u32) -> Vec<u8> {
    let mut bytes = SkeletonHeader::new(bone_count).to_bytes().to_vec();
    let identity_cols: [f32; 12] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
    for _ in 0..bone_count {
        for v in identity_cols {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    bytes
}

pub fn sound_bytes(samples: usize) -> Vec<u8> {
    let pcm: Vec<i16> = (0..samples).map(|i| (i as i16).wrapping_mul(97)).collect();
    encode_sound(&pcm)
}
