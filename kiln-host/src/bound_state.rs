//! Bound render state
//!
//! The registers a `draw_*` call reads. They are render-scoped: reset to
//! defaults at the start of every `render()` pass and never snapshotted.

use kiln_common::{BoneMatrix3x4, MAX_BONES};
use xxhash_rust::xxh3::Xxh3;

use crate::handle::{Handle, raw_or_zero};

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    #[default]
    None,
    Back,
    Front,
}

impl CullMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Back),
            2 => Some(Self::Front),
            _ => None,
        }
    }
}

/// Blend mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    None,
    Alpha,
    Additive,
    Multiply,
}

impl BlendMode {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Alpha),
            2 => Some(Self::Additive),
            3 => Some(Self::Multiply),
            _ => None,
        }
    }
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    #[default]
    Nearest,
    Linear,
}

impl TextureFilter {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Nearest),
            1 => Some(Self::Linear),
            _ => None,
        }
    }
}

/// Where skinned draws read bone matrices from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyframeSource {
    /// Matrix index into the device keyframe region
    Static { offset: u32 },
    /// Matrix index into the frame's immediate bone arena
    Immediate { offset: u32 },
}

impl Default for KeyframeSource {
    fn default() -> Self {
        Self::Static { offset: 0 }
    }
}

/// Procedural sky registers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyState {
    pub horizon_color: u32,
    pub zenith_color: u32,
    /// Unit vector
    pub sun_direction: [f32; 3],
    pub sun_color: u32,
    /// 0.0 (soft) to 1.0 (sharp)
    pub sun_sharpness: f32,
}

impl Default for SkyState {
    fn default() -> Self {
        Self {
            horizon_color: 0x000000FF,
            zenith_color: 0x000000FF,
            sun_direction: [0.0, -1.0, 0.0],
            sun_color: 0xFFFFFFFF,
            sun_sharpness: 0.0,
        }
    }
}

impl SkyState {
    pub(crate) fn hash_into(&self, hasher: &mut Xxh3) {
        hasher.update(&self.horizon_color.to_le_bytes());
        hasher.update(&self.zenith_color.to_le_bytes());
        for v in self.sun_direction {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        hasher.update(&self.sun_color.to_le_bytes());
        hasher.update(&self.sun_sharpness.to_bits().to_le_bytes());
    }
}

/// Number of texture slots (0 = albedo, 1-3 = matcap)
pub const TEXTURE_SLOTS: usize = 4;

/// Current-frame render registers
#[derive(Debug, Clone)]
pub struct BoundState {
    /// 0xRRGGBBAA
    pub color: u32,
    pub depth_test: bool,
    pub cull_mode: CullMode,
    pub blend_mode: BlendMode,
    pub texture_filter: TextureFilter,
    /// 0 (transparent) to 15 (opaque)
    pub uniform_alpha: u8,
    /// Each component 0-3
    pub dither_offset: (u8, u8),
    pub textures: [Option<Handle>; TEXTURE_SLOTS],
    pub sky: SkyState,
    pub keyframe_source: KeyframeSource,
    pub bone_count: u32,
    /// Bound keyframe collection and wrapped frame
    pub keyframes: Option<(Handle, u32)>,
    pub skeleton: Option<Handle>,
    /// Guest-supplied matrices for `KeyframeSource::Immediate`
    pub immediate_bones: Vec<BoneMatrix3x4>,
}

impl Default for BoundState {
    fn default() -> Self {
        Self {
            color: 0xFFFFFFFF,
            depth_test: true,
            cull_mode: CullMode::None,
            blend_mode: BlendMode::None,
            texture_filter: TextureFilter::Nearest,
            uniform_alpha: 15,
            dither_offset: (0, 0),
            textures: [None; TEXTURE_SLOTS],
            sky: SkyState::default(),
            keyframe_source: KeyframeSource::default(),
            bone_count: 0,
            keyframes: None,
            skeleton: None,
            immediate_bones: Vec::with_capacity(MAX_BONES),
        }
    }
}

impl BoundState {
    /// Restore every register to its default, keeping buffer capacity
    pub fn reset(&mut self) {
        let mut bones = std::mem::take(&mut self.immediate_bones);
        bones.clear();
        *self = Self {
            immediate_bones: bones,
            ..Self::default()
        };
    }

    /// Registers captured by a mesh draw
    pub fn draw_state(&self) -> DrawState {
        DrawState {
            color: self.color,
            depth_test: self.depth_test,
            cull_mode: self.cull_mode,
            blend_mode: self.blend_mode,
            texture_filter: self.texture_filter,
            uniform_alpha: self.uniform_alpha,
            dither_offset: self.dither_offset,
            textures: self.textures.map(raw_or_zero),
            keyframe_source: self.keyframe_source,
            bone_count: self.bone_count,
            skeleton: raw_or_zero(self.skeleton),
        }
    }
}

/// Snapshot of the registers a mesh draw depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub color: u32,
    pub depth_test: bool,
    pub cull_mode: CullMode,
    pub blend_mode: BlendMode,
    pub texture_filter: TextureFilter,
    pub uniform_alpha: u8,
    pub dither_offset: (u8, u8),
    pub textures: [u32; TEXTURE_SLOTS],
    pub keyframe_source: KeyframeSource,
    pub bone_count: u32,
    pub skeleton: u32,
}

impl DrawState {
    pub(crate) fn hash_into(&self, hasher: &mut Xxh3) {
        hasher.update(&self.color.to_le_bytes());
        hasher.update(&[
            self.depth_test as u8,
            self.cull_mode as u8,
            self.blend_mode as u8,
            self.texture_filter as u8,
            self.uniform_alpha,
            self.dither_offset.0,
            self.dither_offset.1,
        ]);
        for t in self.textures {
            hasher.update(&t.to_le_bytes());
        }
        let (tag, offset) = match self.keyframe_source {
            KeyframeSource::Static { offset } => (0u8, offset),
            KeyframeSource::Immediate { offset } => (1u8, offset),
        };
        hasher.update(&[tag]);
        hasher.update(&offset.to_le_bytes());
        hasher.update(&self.bone_count.to_le_bytes());
        hasher.update(&self.skeleton.to_le_bytes());
    }
}
