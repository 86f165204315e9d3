//! Keyframe engine tests

use std::sync::Arc;

use super::*;
use crate::device::DeviceBudgets;
use crate::test_utils::*;

struct Fixture {
    store: AssetStore,
    registry: HandleRegistry,
    engine: KeyframeEngine,
}

impl Fixture {
    fn new() -> Self {
        Self {
            store: AssetStore::headless(
                DeviceBudgets::default(),
                Some(Arc::new(walk_idle_archive())),
            ),
            registry: HandleRegistry::new(),
            engine: KeyframeEngine::new(),
        }
    }

    fn load(&mut self, source: AssetSource<'_>) -> Result<Handle, ResourceError> {
        self.engine
            .load(&mut self.store, &mut self.registry, source)
    }

    fn read_vec(&self, raw: u32, frame: u32) -> Vec<u8> {
        let mut out = vec![0u8; self.engine.bone_count(raw) as usize * 48];
        let written = self.engine.read(&self.store, raw, frame, &mut out).unwrap();
        assert_eq!(written, out.len());
        out
    }
}

fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[test]
fn test_64_bone_4_frame_block_reports_counts() {
    let mut fx = Fixture::new();
    let h = fx
        .load(AssetSource::Bytes(&keyframe_bytes(64, 4, 0.0)))
        .unwrap();
    assert_eq!(fx.engine.bone_count(h.to_raw()), 64);
    assert_eq!(fx.engine.frame_count(h.to_raw()), 4);
}

#[test]
fn test_counts_stay_constant_across_bind_and_read() {
    let mut fx = Fixture::new();
    let raw = fx.load(AssetSource::Archive("walk")).unwrap().to_raw();
    let mut bound = BoundState::default();
    for frame in 0..20 {
        fx.engine.bind(&mut bound, raw, frame);
        fx.read_vec(raw, frame);
        assert_eq!(fx.engine.bone_count(raw), 64);
        assert_eq!(fx.engine.frame_count(raw), 4);
    }
}

#[test]
fn test_read_is_repeatable_and_row_major() {
    let mut fx = Fixture::new();
    let raw = fx.load(AssetSource::Archive("idle")).unwrap().to_raw();

    let first = fx.read_vec(raw, 3);
    let second = fx.read_vec(raw, 3);
    assert_eq!(first, second);
    assert_eq!(first.len(), 64 * 48);

    // Bone 7: translation (frame, bone, tag) in column 3 of each row
    let bone = 7 * 48;
    assert_eq!(f32_at(&first, bone + 12), 3.0);
    assert_eq!(f32_at(&first, bone + 28), 7.0);
    assert_eq!(f32_at(&first, bone + 44), 2.0);
}

#[test]
fn test_read_wraps_frame_index() {
    let mut fx = Fixture::new();
    let raw = fx.load(AssetSource::Archive("walk")).unwrap().to_raw();
    assert_eq!(fx.read_vec(raw, 6), fx.read_vec(raw, 2));
    assert_eq!(fx.read_vec(raw, u32::MAX), fx.read_vec(raw, u32::MAX % 4));
}

#[test]
fn test_read_too_small_writes_nothing() {
    let mut fx = Fixture::new();
    let raw = fx.load(AssetSource::Archive("walk")).unwrap().to_raw();
    let mut out = vec![0xAAu8; 64 * 48 - 1];
    assert_eq!(
        fx.engine.read(&fx.store, raw, 0, &mut out),
        Err(ResourceError::BufferTooSmall {
            needed: 64 * 48,
            available: 64 * 48 - 1
        })
    );
    assert!(out.iter().all(|&b| b == 0xAA));
}

#[test]
fn test_read_invalid_handle() {
    let fx = Fixture::new();
    let mut out = vec![0u8; 64];
    for raw in [0, 1, 42] {
        assert!(matches!(
            fx.engine.read(&fx.store, raw, 0, &mut out),
            Err(ResourceError::InvalidHandle { .. })
        ));
    }
}

#[test]
fn test_bind_wraps_like_modulo() {
    let mut fx = Fixture::new();
    let raw = fx.load(AssetSource::Archive("walk")).unwrap().to_raw();

    let mut wrapped = BoundState::default();
    let mut direct = BoundState::default();
    for frame in [4, 5, 7, 1000, u32::MAX] {
        fx.engine.bind(&mut wrapped, raw, frame);
        fx.engine.bind(&mut direct, raw, frame % 4);
        assert_eq!(wrapped.keyframe_source, direct.keyframe_source);
        assert_eq!(wrapped.keyframes, direct.keyframes);
        assert_eq!(wrapped.bone_count, 64);
    }
}

#[test]
fn test_walk_then_idle_binds_wrapped_frame() {
    let mut fx = Fixture::new();
    let walk = fx.load(AssetSource::Archive("walk")).unwrap();
    let idle = fx.load(AssetSource::Archive("idle")).unwrap();
    let idle_base = fx.engine.info(idle.to_raw()).unwrap().base_offset;
    assert_eq!(idle_base, 64 * 4);

    let mut bound = BoundState::default();
    fx.engine.bind(&mut bound, walk.to_raw(), 2);
    assert_eq!(bound.keyframe_source, KeyframeSource::Static { offset: 2 * 64 });
    assert_eq!(bound.keyframes, Some((walk, 2)));

    fx.engine.bind(&mut bound, idle.to_raw(), 10);
    let after_wrap = (bound.keyframe_source, bound.keyframes, bound.bone_count);

    fx.engine.bind(&mut bound, idle.to_raw(), 2);
    assert_eq!(
        after_wrap,
        (bound.keyframe_source, bound.keyframes, bound.bone_count)
    );
    assert_eq!(
        bound.keyframe_source,
        KeyframeSource::Static {
            offset: idle_base + 2 * 64
        }
    );
}

#[test]
fn test_bind_zero_unbinds_and_invalid_is_noop() {
    let mut fx = Fixture::new();
    let raw = fx.load(AssetSource::Archive("walk")).unwrap().to_raw();
    let mut bound = BoundState::default();

    fx.engine.bind(&mut bound, raw, 1);
    fx.engine.bind(&mut bound, 99, 3);
    assert_eq!(bound.keyframe_source, KeyframeSource::Static { offset: 64 });

    fx.engine.bind(&mut bound, 0, 3);
    assert_eq!(bound.keyframe_source, KeyframeSource::Static { offset: 0 });
    assert_eq!(bound.bone_count, 0);
    assert_eq!(bound.keyframes, None);
}

#[test]
fn test_queries_on_wrong_kind_return_zero() {
    let mut fx = Fixture::new();
    let record = fx
        .store
        .load(AssetKind::Texture, AssetSource::Bytes(&texture_bytes(2, 2)))
        .unwrap();
    let texture = fx.registry.register(record).unwrap();
    assert_eq!(fx.engine.bone_count(texture.to_raw()), 0);
    assert_eq!(fx.engine.frame_count(texture.to_raw()), 0);
    assert_eq!(fx.engine.bone_count(0), 0);
}

#[test]
fn test_malformed_blocks_are_rejected() {
    let mut fx = Fixture::new();

    let mut bad_flags = keyframe_bytes(2, 2, 0.0);
    bad_flags[1] = 1;
    let mut short = keyframe_bytes(2, 2, 0.0);
    short.truncate(short.len() - 1);

    for bytes in [vec![2, 0], bad_flags, short, vec![0, 0, 1, 0]] {
        assert!(matches!(
            fx.load(AssetSource::Bytes(&bytes)),
            Err(ResourceError::AssetDecodeError {
                kind: AssetKind::Keyframes,
                ..
            })
        ));
    }
    assert!(fx.registry.is_empty());
    assert!(fx.engine.is_empty());
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let mut fx = Fixture::new();
    let mut bytes = keyframe_bytes(3, 2, 0.0);
    bytes.extend_from_slice(&[0xFF; 7]);
    let raw = fx.load(AssetSource::Bytes(&bytes)).unwrap().to_raw();
    assert_eq!(fx.engine.frame_count(raw), 2);
}

#[test]
fn test_load_after_seal_fails() {
    let mut fx = Fixture::new();
    fx.load(AssetSource::Archive("walk")).unwrap();
    fx.registry.seal();
    assert_eq!(
        fx.load(AssetSource::Archive("idle")),
        Err(ResourceError::NotInitPhase {
            operation: "keyframes_load"
        })
    );
    assert_eq!(fx.engine.len(), 1);
}
