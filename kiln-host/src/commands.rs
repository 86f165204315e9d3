//! Frame command lists
//!
//! Draw commands are cleared at the start of every render pass; audio
//! commands accumulate until the host drains them after a tick. Both lists
//! are pre-reserved so recording does not allocate in steady state.

use kiln_common::{BoneMatrix3x4, MAX_BONES};
use xxhash_rust::xxh3::Xxh3;

use crate::bound_state::{DrawState, KeyframeSource, SkyState};
use crate::handle::Handle;

const DRAW_CAPACITY: usize = 1024;
const AUDIO_CAPACITY: usize = 64;
const IMMEDIATE_BONE_CAPACITY: usize = MAX_BONES * 16;

/// A recorded draw
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    DrawMesh { mesh: Handle, state: DrawState },
    DrawSky { sky: SkyState },
}

/// A recorded audio event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCommand {
    PlaySound { sound: Handle, volume: f32, pan: f32 },
}

/// Commands recorded by the guest during the current frame
#[derive(Debug, Clone)]
pub struct FrameCommands {
    draws: Vec<DrawCommand>,
    audio: Vec<AudioCommand>,
    /// Immediate bone matrices referenced by this frame's draws
    immediate_bones: Vec<BoneMatrix3x4>,
}

impl Default for FrameCommands {
    fn default() -> Self {
        Self {
            draws: Vec::with_capacity(DRAW_CAPACITY),
            audio: Vec::with_capacity(AUDIO_CAPACITY),
            immediate_bones: Vec::with_capacity(IMMEDIATE_BONE_CAPACITY),
        }
    }
}

impl FrameCommands {
    /// Start a render pass: drop last frame's draws
    pub fn begin_frame(&mut self) {
        self.draws.clear();
        self.immediate_bones.clear();
    }

    /// Record a mesh draw
    ///
    /// Immediate bones are copied into the frame arena so later `set_bones`
    /// calls do not affect this draw.
    pub fn draw_mesh(&mut self, mesh: Handle, mut state: DrawState, immediate: &[BoneMatrix3x4]) {
        if matches!(state.keyframe_source, KeyframeSource::Immediate { .. }) {
            state.keyframe_source = KeyframeSource::Immediate {
                offset: self.immediate_bones.len() as u32,
            };
            self.immediate_bones.extend_from_slice(immediate);
        }
        self.draws.push(DrawCommand::DrawMesh { mesh, state });
    }

    pub fn draw_sky(&mut self, sky: SkyState) {
        self.draws.push(DrawCommand::DrawSky { sky });
    }

    pub fn play_sound(&mut self, sound: Handle, volume: f32, pan: f32) {
        self.audio.push(AudioCommand::PlaySound { sound, volume, pan });
    }

    pub fn draws(&self) -> &[DrawCommand] {
        &self.draws
    }

    pub fn audio(&self) -> &[AudioCommand] {
        &self.audio
    }

    pub fn immediate_bones(&self) -> &[BoneMatrix3x4] {
        &self.immediate_bones
    }

    /// Hand queued audio to the mixer
    pub fn drain_audio(&mut self) -> std::vec::Drain<'_, AudioCommand> {
        self.audio.drain(..)
    }

    /// Digest of every recorded command, for replay comparison
    pub fn digest(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for draw in &self.draws {
            match draw {
                DrawCommand::DrawMesh { mesh, state } => {
                    hasher.update(&[0]);
                    hasher.update(&mesh.to_raw().to_le_bytes());
                    state.hash_into(&mut hasher);
                }
                DrawCommand::DrawSky { sky } => {
                    hasher.update(&[1]);
                    sky.hash_into(&mut hasher);
                }
            }
        }
        for AudioCommand::PlaySound { sound, volume, pan } in &self.audio {
            hasher.update(&[2]);
            hasher.update(&sound.to_raw().to_le_bytes());
            hasher.update(&volume.to_bits().to_le_bytes());
            hasher.update(&pan.to_bits().to_le_bytes());
        }
        hasher.update(bytemuck::cast_slice(&self.immediate_bones));
        hasher.digest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound_state::BoundState;

    fn handle(raw: u32) -> Handle {
        Handle::from_raw(raw).unwrap()
    }

    #[test]
    fn test_begin_frame_clears_draws_but_not_audio() {
        let mut commands = FrameCommands::default();
        commands.draw_sky(SkyState::default());
        commands.play_sound(handle(1), 1.0, 0.0);

        commands.begin_frame();
        assert!(commands.draws().is_empty());
        assert_eq!(commands.audio().len(), 1);
        assert_eq!(commands.drain_audio().count(), 1);
        assert!(commands.audio().is_empty());
    }

    #[test]
    fn test_immediate_draws_get_private_bone_ranges() {
        let mut commands = FrameCommands::default();
        let mut bound = BoundState {
            keyframe_source: KeyframeSource::Immediate { offset: 0 },
            bone_count: 2,
            ..BoundState::default()
        };
        bound.immediate_bones = vec![BoneMatrix3x4::IDENTITY; 2];

        commands.draw_mesh(handle(1), bound.draw_state(), &bound.immediate_bones);
        commands.draw_mesh(handle(1), bound.draw_state(), &bound.immediate_bones);

        let offsets: Vec<_> = commands
            .draws()
            .iter()
            .map(|d| match d {
                DrawCommand::DrawMesh { state, .. } => state.keyframe_source,
                DrawCommand::DrawSky { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(
            offsets,
            vec![
                KeyframeSource::Immediate { offset: 0 },
                KeyframeSource::Immediate { offset: 2 }
            ]
        );
        assert_eq!(commands.immediate_bones().len(), 4);
    }

    #[test]
    fn test_digest_tracks_order_and_content() {
        let bound = BoundState::default();
        let mut a = FrameCommands::default();
        a.draw_mesh(handle(1), bound.draw_state(), &[]);
        a.draw_sky(bound.sky);

        let mut b = FrameCommands::default();
        b.draw_sky(bound.sky);
        b.draw_mesh(handle(1), bound.draw_state(), &[]);
        assert_ne!(a.digest(), b.digest());

        let mut c = FrameCommands::default();
        c.draw_mesh(handle(1), bound.draw_state(), &[]);
        c.draw_sky(bound.sky);
        assert_eq!(a.digest(), c.digest());
    }
}
