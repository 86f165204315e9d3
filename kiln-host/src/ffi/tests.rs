//! FFI tests against small WAT guests

use std::sync::Arc;

use kiln_common::ArchivePack;
use kiln_core::{GameInstance, WasmEngine};

use super::create_linker;
use crate::asset_store::AssetStore;
use crate::bound_state::KeyframeSource;
use crate::commands::DrawCommand;
use crate::device::{DeviceBudgets, DeviceRegion};
use crate::input::KilnInput;
use crate::state::KilnFfiState;
use crate::test_utils::{keyframe_bytes, texture_bytes, triangle_mesh_bytes, walk_idle_archive};

const DT: f32 = 1.0 / 60.0;

const IMPORTS: &str = r#"
    (import "env" "set_tick_rate" (func $set_tick_rate (param i32)))
    (import "env" "set_clear_color" (func $set_clear_color (param i32)))
    (import "env" "rom_keyframes" (func $rom_keyframes (param i32 i32) (result i32)))
    (import "env" "keyframes_load" (func $keyframes_load (param i32 i32) (result i32)))
    (import "env" "keyframes_bone_count" (func $keyframes_bone_count (param i32) (result i32)))
    (import "env" "keyframes_frame_count" (func $keyframes_frame_count (param i32) (result i32)))
    (import "env" "keyframe_bind" (func $keyframe_bind (param i32 i32)))
    (import "env" "keyframe_read" (func $keyframe_read (param i32 i32 i32 i32) (result i32)))
    (import "env" "rom_data_len" (func $rom_data_len (param i32 i32) (result i32)))
    (import "env" "rom_data" (func $rom_data (param i32 i32 i32 i32) (result i32)))
    (import "env" "load_mesh" (func $load_mesh (param i32 i32) (result i32)))
    (import "env" "load_texture" (func $load_texture (param i32 i32 i32) (result i32)))
    (import "env" "texture_bind" (func $texture_bind (param i32)))
    (import "env" "set_color" (func $set_color (param i32)))
    (import "env" "set_bones" (func $set_bones (param i32 i32)))
    (import "env" "draw_mesh" (func $draw_mesh (param i32)))
    (import "env" "draw_sky" (func $draw_sky))
    (import "env" "play_sound" (func $play_sound (param i32 f32 f32)))
"#;

/// Module with the Kiln imports, one page of memory and `body` appended
fn guest(body: &str) -> String {
    format!(
        r#"(module {IMPORTS} (memory (export "memory") 1) {body})"#
    )
}

/// `(data ...)` segment holding `bytes` at `offset`
fn data_segment(offset: u32, bytes: &[u8]) -> String {
    let escaped: String = bytes.iter().map(|b| format!("\\{b:02x}")).collect();
    format!(r#"(data (i32.const {offset}) "{escaped}")"#)
}

fn instantiate(wat_src: &str, archive: Option<ArchivePack>) -> GameInstance<KilnInput, KilnFfiState> {
    let engine = WasmEngine::new().unwrap();
    let wasm = wat::parse_str(wat_src).unwrap();
    let module = engine.load_module(&wasm).unwrap();
    let linker = create_linker(&engine).unwrap();
    let mut game = GameInstance::new(&engine, &module, &linker).unwrap();
    *game.console_state_mut() =
        KilnFfiState::new(AssetStore::headless(DeviceBudgets::default(), archive.map(Arc::new)));
    game
}

fn read_u32(memory: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(memory[offset..offset + 4].try_into().unwrap())
}

fn read_f32(memory: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes(memory[offset..offset + 4].try_into().unwrap())
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_during_init_is_applied() {
    let mut game = instantiate(
        &guest(r#"(func (export "init") (call $set_tick_rate (i32.const 3)) (call $set_clear_color (i32.const 0x112233FF)))"#),
        None,
    );
    game.init().unwrap();
    let config = &game.console_state().init_config;
    assert_eq!(config.tick_rate(), 120);
    assert_eq!(config.clear_color, 0x112233FF);
}

#[test]
fn test_config_twice_traps() {
    let mut game = instantiate(
        &guest(r#"(func (export "init") (call $set_tick_rate (i32.const 1)) (call $set_tick_rate (i32.const 2)))"#),
        None,
    );
    let err = game.init().unwrap_err();
    assert!(format!("{:#}", err).contains("called twice"));
}

#[test]
fn test_config_out_of_range_traps() {
    let mut game = instantiate(
        &guest(r#"(func (export "init") (call $set_tick_rate (i32.const 4)))"#),
        None,
    );
    assert!(game.init().is_err());
}

#[test]
fn test_config_after_seal_traps() {
    let mut game = instantiate(
        &guest(r#"(func (export "update") (call $set_clear_color (i32.const 0)))"#),
        None,
    );
    game.init().unwrap();
    let err = game.update(DT).unwrap_err();
    assert!(format!("{:#}", err).contains("set_clear_color: only allowed during init()"));
}

// ============================================================================
// Loading and sealing
// ============================================================================

#[test]
fn test_rom_keyframes_loads_and_seals() {
    let mut game = instantiate(
        &guest(&format!(
            r#"{}
            (func (export "init")
                (local $h i32)
                (local.set $h (call $rom_keyframes (i32.const 0) (i32.const 4)))
                (i32.store (i32.const 16) (local.get $h))
                (i32.store (i32.const 20) (call $keyframes_bone_count (local.get $h)))
                (i32.store (i32.const 24) (call $keyframes_frame_count (local.get $h))))
            (func (export "update"))"#,
            data_segment(0, b"walk")
        )),
        Some(walk_idle_archive()),
    );
    game.init().unwrap();
    game.update(DT).unwrap();

    let memory = game.save_state().unwrap();
    assert_eq!(read_u32(&memory, 16), 1);
    assert_eq!(read_u32(&memory, 20), 64);
    assert_eq!(read_u32(&memory, 24), 4);

    let state = game.console_state();
    assert!(state.registry.is_sealed());
    assert!(state.fingerprint().is_some());
    assert_eq!(state.verify_partition(), Ok(()));
    assert_eq!(state.store.device().used(DeviceRegion::Keyframe), 64 * 4 * 48);
}

#[test]
fn test_missing_rom_asset_returns_zero_and_aborts_at_seal() {
    let mut game = instantiate(
        &guest(&format!(
            r#"{}
            (func (export "init")
                (i32.store (i32.const 16) (call $rom_keyframes (i32.const 0) (i32.const 4))))
            (func (export "update"))"#,
            data_segment(0, b"jump")
        )),
        Some(walk_idle_archive()),
    );
    game.init().unwrap();
    assert_eq!(read_u32(&game.save_state().unwrap(), 16), 0);
    assert_eq!(game.console_state().deferred_failures().len(), 1);

    let err = game.update(DT).unwrap_err();
    assert!(format!("{:#}", err).contains("'jump' not found"));
    assert!(!game.is_sealed());
    assert_eq!(game.state().tick_count, 0);
}

#[test]
fn test_load_after_seal_traps() {
    let mut game = instantiate(
        &guest(&format!(
            r#"{}
            (func (export "update")
                (drop (call $rom_keyframes (i32.const 0) (i32.const 4))))"#,
            data_segment(0, b"walk")
        )),
        Some(walk_idle_archive()),
    );
    let err = game.update(DT).unwrap_err();
    assert!(format!("{:#}", err).contains("rom_keyframes: only allowed during init()"));
    assert!(game.console_state().registry.is_empty());
}

#[test]
fn test_keyframes_load_from_guest_memory() {
    let bytes = keyframe_bytes(3, 5, 0.0);
    let mut game = instantiate(
        &guest(&format!(
            r#"{}
            (func (export "init")
                (i32.store (i32.const 0)
                    (call $keyframes_load (i32.const 64) (i32.const {}))))"#,
            data_segment(64, &bytes),
            bytes.len()
        )),
        None,
    );
    game.init().unwrap();
    assert_eq!(read_u32(&game.save_state().unwrap(), 0), 1);
    assert_eq!(game.console_state().keyframes.frame_count(1), 5);
}

#[test]
fn test_malformed_keyframes_trap() {
    let mut game = instantiate(
        &guest(&format!(
            r#"{}
            (func (export "init")
                (drop (call $keyframes_load (i32.const 64) (i32.const 3))))"#,
            data_segment(64, &[1, 1, 0])
        )),
        None,
    );
    let err = game.init().unwrap_err();
    assert!(format!("{:#}", err).contains("keyframes_load failed"));
}

#[test]
fn test_load_span_out_of_bounds_traps() {
    let mut game = instantiate(
        &guest(r#"(func (export "init") (drop (call $load_mesh (i32.const 65530) (i32.const 64))))"#),
        None,
    );
    assert!(game.init().is_err());
}

// ============================================================================
// Raw data
// ============================================================================

#[test]
fn test_rom_data_is_all_or_nothing() {
    let mut game = instantiate(
        &guest(&format!(
            r#"{}
            (func (export "init")
                (i32.store (i32.const 16) (call $rom_data_len (i32.const 0) (i32.const 6)))
                (i32.store (i32.const 20)
                    (call $rom_data (i32.const 0) (i32.const 6) (i32.const 512) (i32.const 8)))
                (i32.store (i32.const 24)
                    (call $rom_data (i32.const 0) (i32.const 6) (i32.const 256) (i32.const 32))))"#,
            data_segment(0, b"level1")
        )),
        Some(walk_idle_archive()),
    );
    game.init().unwrap();
    let memory = game.save_state().unwrap();
    assert_eq!(read_u32(&memory, 16), 16);
    assert_eq!(read_u32(&memory, 20), 0);
    assert!(memory[512..520].iter().all(|&b| b == 0));
    assert_eq!(read_u32(&memory, 24), 16);
    assert_eq!(&memory[256..272], &(0u8..16).collect::<Vec<_>>()[..]);
}

#[test]
fn test_rom_data_unknown_id_returns_zero() {
    let mut game = instantiate(
        &guest(&format!(
            r#"{}
            (func (export "init")
                (i32.store (i32.const 16) (call $rom_data_len (i32.const 0) (i32.const 4))))"#,
            data_segment(0, b"nope")
        )),
        Some(walk_idle_archive()),
    );
    game.init().unwrap();
    assert_eq!(read_u32(&game.save_state().unwrap(), 16), 0);
    // Raw data lookups never abort startup
    assert!(game.console_state().deferred_failures().is_empty());
}

// ============================================================================
// Keyframe readback
// ============================================================================

#[test]
fn test_keyframe_read_wraps_and_matches_engine() {
    let mut game = instantiate(
        &guest(&format!(
            r#"{}
            (func (export "init")
                (i32.store (i32.const 16) (call $rom_keyframes (i32.const 0) (i32.const 4))))
            (func (export "render")
                (i32.store (i32.const 20)
                    (call $keyframe_read (i32.load (i32.const 16)) (i32.const 6)
                        (i32.const 1024) (i32.const 3072)))
                (i32.store (i32.const 24)
                    (call $keyframe_read (i32.const 99) (i32.const 0)
                        (i32.const 8192) (i32.const 3072)))
                (i32.store (i32.const 28)
                    (call $keyframe_read (i32.load (i32.const 16)) (i32.const 0)
                        (i32.const 8192) (i32.const 3071))))"#,
            data_segment(0, b"walk")
        )),
        Some(walk_idle_archive()),
    );
    game.init().unwrap();
    game.render().unwrap();

    let memory = game.save_state().unwrap();
    assert_eq!(read_u32(&memory, 20), 64 * 48);
    assert_eq!(read_u32(&memory, 24), 0);
    assert_eq!(read_u32(&memory, 28), 0);
    assert!(memory[8192..8192 + 3072].iter().all(|&b| b == 0));

    // Frame 6 wraps to 2; bone 7 is translated to (2, 7, 1)
    let bone = 1024 + 7 * 48;
    assert_eq!(read_f32(&memory, bone + 12), 2.0);
    assert_eq!(read_f32(&memory, bone + 28), 7.0);
    assert_eq!(read_f32(&memory, bone + 44), 1.0);

    let state = game.console_state();
    let mut expected = vec![0u8; 64 * 48];
    state.keyframes.read(&state.store, 1, 2, &mut expected).unwrap();
    assert_eq!(&memory[1024..1024 + 3072], &expected[..]);
}

// ============================================================================
// Render path
// ============================================================================

fn render_guest(render_body: &str) -> String {
    let mesh = triangle_mesh_bytes();
    let texture = texture_bytes(2, 2)[4..].to_vec();
    let bones: Vec<u8> = (0..24).flat_map(|i| (i as f32).to_le_bytes()).collect();
    guest(&format!(
        r#"{walk}{mesh_data}{texture_data}{bone_data}
        (func (export "init")
            (i32.store (i32.const 16) (call $rom_keyframes (i32.const 0) (i32.const 4)))
            (i32.store (i32.const 20) (call $load_mesh (i32.const 256) (i32.const {mesh_len})))
            (i32.store (i32.const 24)
                (call $load_texture (i32.const 2) (i32.const 2) (i32.const 512))))
        (func (export "render") {render_body})"#,
        walk = data_segment(0, b"walk"),
        mesh_data = data_segment(256, &mesh),
        mesh_len = mesh.len(),
        texture_data = data_segment(512, &texture),
        bone_data = data_segment(1024, &bones),
    ))
}

#[test]
fn test_draw_mesh_snapshots_bound_registers() {
    let mut game = instantiate(
        &render_guest(
            r#"
            (call $set_color (i32.const 0xFF0000FF))
            (call $texture_bind (i32.load (i32.const 24)))
            (call $keyframe_bind (i32.load (i32.const 16)) (i32.const 5))
            (call $draw_mesh (i32.load (i32.const 20)))
            (call $set_color (i32.const 0x00FF00FF))
            (call $draw_sky)
            (call $draw_mesh (i32.const 77))
            (call $play_sound (i32.const 0) (f32.const 1) (f32.const 0))"#,
        ),
        Some(walk_idle_archive()),
    );
    game.init().unwrap();
    game.render().unwrap();

    let commands = &game.console_state().commands;
    assert_eq!(commands.draws().len(), 2);
    assert!(commands.audio().is_empty());
    let DrawCommand::DrawMesh { mesh, state } = &commands.draws()[0] else {
        panic!("expected a mesh draw");
    };
    assert_eq!(mesh.to_raw(), 2);
    assert_eq!(state.color, 0xFF0000FF);
    assert_eq!(state.textures[0], 3);
    // Frame 5 of a 4-frame, 64-bone clip starting at matrix 0
    assert_eq!(state.keyframe_source, KeyframeSource::Static { offset: 64 });
    assert_eq!(state.bone_count, 64);
    assert!(matches!(commands.draws()[1], DrawCommand::DrawSky { .. }));

    let first = commands.digest();
    game.render().unwrap();
    assert_eq!(game.console_state().commands.draws().len(), 2);
    assert_eq!(game.console_state().commands.digest(), first);
}

#[test]
fn test_set_bones_feeds_immediate_draws() {
    let mut game = instantiate(
        &render_guest(
            r#"
            (call $set_bones (i32.const 1024) (i32.const 2))
            (call $draw_mesh (i32.load (i32.const 20)))
            (call $draw_mesh (i32.load (i32.const 20)))"#,
        ),
        Some(walk_idle_archive()),
    );
    game.init().unwrap();
    game.render().unwrap();

    let commands = &game.console_state().commands;
    assert_eq!(commands.immediate_bones().len(), 4);
    assert_eq!(commands.immediate_bones()[1].row0, [12.0, 13.0, 14.0, 15.0]);
    let offsets: Vec<_> = commands
        .draws()
        .iter()
        .filter_map(|d| match d {
            DrawCommand::DrawMesh { state, .. } => Some((state.keyframe_source, state.bone_count)),
            DrawCommand::DrawSky { .. } => None,
        })
        .collect();
    assert_eq!(
        offsets,
        vec![
            (KeyframeSource::Immediate { offset: 0 }, 2),
            (KeyframeSource::Immediate { offset: 2 }, 2),
        ]
    );
}

#[test]
fn test_render_resets_bound_state() {
    let mut game = instantiate(
        &render_guest(
            r#"
            (if (i32.eqz (i32.load (i32.const 32)))
                (then
                    (call $set_color (i32.const 0x12345678))
                    (i32.store (i32.const 32) (i32.const 1))))
            (call $draw_mesh (i32.load (i32.const 20)))"#,
        ),
        Some(walk_idle_archive()),
    );
    game.init().unwrap();
    game.render().unwrap();
    game.render().unwrap();
    let DrawCommand::DrawMesh { state, .. } = &game.console_state().commands.draws()[0] else {
        panic!("expected a mesh draw");
    };
    assert_eq!(state.color, 0xFFFFFFFF);
}
