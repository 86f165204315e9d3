//! Tests for ArchivePack and its entry types

use super::*;
use crate::formats::{KeyframeBlockBuilder, PackedBoneKeyframe};
use crate::math::BoneMatrix3x4;
use glam::{Quat, Vec3};

fn sample_keyframes(id: &str, bone_count: u8, frames: u16) -> PackedKeyframes {
    let mut builder = KeyframeBlockBuilder::new(bone_count);
    for f in 0..frames {
        let bones: Vec<_> = (0..bone_count)
            .map(|b| {
                PackedBoneKeyframe::encode(
                    Quat::IDENTITY,
                    Vec3::new(f as f32, b as f32, 0.0),
                    Vec3::ONE,
                )
            })
            .collect();
        builder.push_frame(&bones).unwrap();
    }
    PackedKeyframes::new(id, bone_count, frames, builder.frame_data().to_vec())
}

fn sample_pack() -> ArchivePack {
    let mut pack = ArchivePack::new();
    pack.textures
        .push(PackedTexture::new("player", 2, 2, vec![0xFF; 16]));
    pack.meshes.push(PackedMesh {
        id: "tri".to_string(),
        format: 0,
        vertex_count: 3,
        index_count: 3,
        vertex_data: vec![0; 24],
        index_data: vec![0, 1, 2],
    });
    pack.skeletons.push(PackedSkeleton::new(
        "rig",
        vec![BoneMatrix3x4::IDENTITY; 4],
    ));
    pack.keyframes.push(sample_keyframes("walk", 4, 3));
    pack.sounds.push(PackedSound::new("jump", vec![0, 100, -100]));
    pack.data.push(PackedData::new("level1", vec![1, 2, 3, 4]));
    pack
}

#[test]
fn test_empty_archive() {
    let pack = ArchivePack::new();
    assert!(pack.is_empty());
    assert_eq!(pack.asset_count(), 0);
}

#[test]
fn test_find_by_id() {
    let pack = sample_pack();
    assert_eq!(pack.asset_count(), 6);
    assert_eq!(pack.find_texture("player").map(|t| t.width), Some(2));
    assert!(pack.find_mesh("tri").is_some());
    assert_eq!(pack.find_skeleton("rig").map(|s| s.bone_count), Some(4));
    assert_eq!(pack.find_keyframes("walk").map(|k| k.frame_count), Some(3));
    assert!(pack.find_sound("jump").is_some());
    assert_eq!(
        pack.find_data("level1").map(|d| d.data.as_slice()),
        Some(&[1u8, 2, 3, 4][..])
    );
    assert!(pack.find_texture("missing").is_none());
    assert!(pack.find_font("any").is_none());
}

#[test]
fn test_bytes_round_trip_preserves_lookups() {
    let pack = sample_pack();
    let bytes = pack.to_bytes();
    assert_eq!(&bytes[0..4], ARCHIVE_MAGIC);

    let decoded = ArchivePack::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.asset_count(), pack.asset_count());
    assert_eq!(decoded.find_keyframes("walk"), pack.find_keyframes("walk"));
    assert_eq!(decoded.find_sound("jump"), pack.find_sound("jump"));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("game.{}", ARCHIVE_EXT));
    sample_pack().save(&path).unwrap();

    let loaded = ArchivePack::load(&path).unwrap();
    let keyframes = loaded.find_keyframes("walk").unwrap();
    let block = keyframes.block().unwrap();
    assert_eq!(block.bone_count(), 4);
    assert_eq!(block.frame_count(), 3);
}

#[test]
fn test_bad_magic_rejected() {
    let mut bytes = sample_pack().to_bytes();
    bytes[0] = b'X';
    assert!(matches!(
        ArchivePack::from_bytes(&bytes),
        Err(ArchiveError::BadMagic)
    ));
}

#[test]
fn test_unsupported_version_rejected() {
    let mut bytes = sample_pack().to_bytes();
    bytes[4..6].copy_from_slice(&99u16.to_le_bytes());
    assert!(matches!(
        ArchivePack::from_bytes(&bytes),
        Err(ArchiveError::UnsupportedVersion { found: 99 })
    ));
}

#[test]
fn test_truncated_archive_rejected() {
    assert!(matches!(
        ArchivePack::from_bytes(b"KPA"),
        Err(ArchiveError::Truncated(3))
    ));
    let bytes = sample_pack().to_bytes();
    assert!(ArchivePack::from_bytes(&bytes[..bytes.len() / 2]).is_err());
}

#[test]
fn test_duplicate_ids_rejected() {
    let mut pack = sample_pack();
    pack.data.push(PackedData::new("level1", vec![9]));
    assert!(matches!(
        pack.validate(),
        Err(ArchiveError::DuplicateId { kind: "data", .. })
    ));
}

#[test]
fn test_invalid_entry_rejected_on_load() {
    let mut pack = sample_pack();
    pack.textures[0].data.truncate(10);
    let err = ArchivePack::from_bytes(&pack.to_bytes()).unwrap_err();
    assert!(err.to_string().contains("texture 'player'"));
}

#[test]
fn test_packed_mesh_rejects_out_of_range_index() {
    let mesh = PackedMesh {
        id: "bad".to_string(),
        format: 0,
        vertex_count: 3,
        index_count: 3,
        vertex_data: vec![0; 24],
        index_data: vec![0, 1, 3],
    };
    assert_eq!(
        mesh.validate(),
        Err(FormatError::IndexOutOfRange {
            index: 3,
            vertex_count: 3
        })
    );
}

#[test]
fn test_packed_keyframes_rejects_short_data() {
    let mut keyframes = sample_keyframes("walk", 2, 2);
    keyframes.data.truncate(40);
    assert!(keyframes.block().is_err());
}

#[test]
fn test_font_glyph_lookup() {
    let font = PackedFont {
        id: "pixel".to_string(),
        atlas_width: 8,
        atlas_height: 8,
        atlas_data: vec![0; 8 * 8 * 4],
        line_height: 8.0,
        baseline: 7.0,
        glyphs: vec![PackedGlyph {
            codepoint: 'A' as u32,
            x: 0,
            y: 0,
            w: 4,
            h: 8,
            x_offset: 0.0,
            y_offset: 0.0,
            advance: 5.0,
        }],
    };
    assert!(font.validate().is_ok());
    assert_eq!(font.find_glyph('A' as u32).map(|g| g.advance), Some(5.0));
    assert!(font.find_glyph('B' as u32).is_none());
}
