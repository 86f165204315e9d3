//! Archive asset entry types

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::formats::{FormatError, KeyframeBlock, KeyframeHeader, TextureFormat, vertex_stride_packed};
use crate::math::BoneMatrix3x4;

/// Packed texture (RGBA8 or BC7 blocks), ready for device upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedTexture {
    /// Asset ID (e.g., "player_idle", "stage1_tileset")
    pub id: String,
    pub width: u16,
    pub height: u16,
    #[serde(default)]
    pub format: TextureFormat,
    /// Pixel data (RGBA8) or compressed blocks (BC7)
    pub data: Vec<u8>,
}

impl PackedTexture {
    /// Create a new RGBA8 packed texture
    pub fn new(id: impl Into<String>, width: u16, height: u16, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            format: TextureFormat::Rgba8,
            data,
        }
    }

    /// Check dimensions and data size
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.width == 0 || self.height == 0 {
            return Err(FormatError::InvalidHeader("zero texture dimension"));
        }
        let expected = self.format.data_size(self.width, self.height);
        if self.data.len() != expected {
            return Err(FormatError::SizeMismatch {
                len: self.data.len(),
                expected,
            });
        }
        Ok(())
    }
}

/// Packed mesh (GPU-ready vertices + indices)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedMesh {
    /// Asset ID (e.g., "player_mesh", "stage1")
    pub id: String,
    /// Vertex format flags (see [`vertex_stride_packed`])
    pub format: u8,
    pub vertex_count: u32,
    pub index_count: u32,
    pub vertex_data: Vec<u8>,
    pub index_data: Vec<u16>,
}

impl PackedMesh {
    /// Bytes per vertex for this mesh's format
    pub fn stride(&self) -> usize {
        vertex_stride_packed(self.format) as usize
    }

    /// Check section sizes and index range
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.vertex_count == 0 {
            return Err(FormatError::InvalidHeader("mesh has no vertices"));
        }
        let expected = self.vertex_count as usize * self.stride();
        if self.vertex_data.len() != expected {
            return Err(FormatError::SizeMismatch {
                len: self.vertex_data.len(),
                expected,
            });
        }
        if self.index_data.len() != self.index_count as usize {
            return Err(FormatError::SizeMismatch {
                len: self.index_data.len(),
                expected: self.index_count as usize,
            });
        }
        if let Some(&index) = self
            .index_data
            .iter()
            .find(|&&i| i as u32 >= self.vertex_count)
        {
            return Err(FormatError::IndexOutOfRange {
                index,
                vertex_count: self.vertex_count,
            });
        }
        Ok(())
    }
}

/// Packed skeleton (inverse bind matrices only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedSkeleton {
    /// Asset ID (e.g., "player_skeleton")
    pub id: String,
    pub bone_count: u32,
    pub inverse_bind_matrices: Vec<BoneMatrix3x4>,
}

impl PackedSkeleton {
    pub fn new(id: impl Into<String>, inverse_bind_matrices: Vec<BoneMatrix3x4>) -> Self {
        Self {
            id: id.into(),
            bone_count: inverse_bind_matrices.len() as u32,
            inverse_bind_matrices,
        }
    }

    /// Check that the bone count matches the matrices
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.bone_count == 0 {
            return Err(FormatError::InvalidHeader("skeleton has no bones"));
        }
        if self.inverse_bind_matrices.len() != self.bone_count as usize {
            return Err(FormatError::SizeMismatch {
                len: self.inverse_bind_matrices.len(),
                expected: self.bone_count as usize,
            });
        }
        Ok(())
    }
}

/// Packed keyframe collection (one animation clip)
///
/// `data` is headerless frame data; the counts live beside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedKeyframes {
    /// Asset ID (e.g., "walk", "run", "idle")
    pub id: String,
    pub bone_count: u8,
    pub frame_count: u16,
    /// frame_count × bone_count × 16 bytes
    pub data: Vec<u8>,
}

impl PackedKeyframes {
    pub fn new(id: impl Into<String>, bone_count: u8, frame_count: u16, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            bone_count,
            frame_count,
            data,
        }
    }

    /// Validated view over the frame data
    pub fn block(&self) -> Result<KeyframeBlock<'_>, FormatError> {
        KeyframeBlock::with_header(
            KeyframeHeader::new(self.bone_count, self.frame_count),
            &self.data,
        )
    }
}

/// Packed font (bitmap atlas + glyph metrics)
///
/// The atlas is uploaded to video memory when the font is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedFont {
    /// Asset ID (e.g., "pixel_font")
    pub id: String,
    pub atlas_width: u32,
    pub atlas_height: u32,
    /// RGBA8 bitmap atlas data
    pub atlas_data: Vec<u8>,
    pub line_height: f32,
    /// Baseline offset from top in pixels
    pub baseline: f32,
    pub glyphs: Vec<PackedGlyph>,
}

impl PackedFont {
    /// Find glyph by codepoint
    pub fn find_glyph(&self, codepoint: u32) -> Option<&PackedGlyph> {
        self.glyphs.iter().find(|g| g.codepoint == codepoint)
    }

    /// Check atlas size and that every glyph lies inside the atlas
    pub fn validate(&self) -> Result<(), FormatError> {
        let expected = self.atlas_width as usize * self.atlas_height as usize * 4;
        if self.atlas_data.len() != expected {
            return Err(FormatError::SizeMismatch {
                len: self.atlas_data.len(),
                expected,
            });
        }
        let outside = self.glyphs.iter().any(|g| {
            g.x as u32 + g.w as u32 > self.atlas_width || g.y as u32 + g.h as u32 > self.atlas_height
        });
        if outside {
            return Err(FormatError::InvalidHeader("glyph outside font atlas"));
        }
        Ok(())
    }
}

/// Glyph metrics within a font atlas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedGlyph {
    /// Unicode codepoint
    pub codepoint: u32,
    /// Atlas rectangle (pixels)
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
    pub x_offset: f32,
    pub y_offset: f32,
    /// Horizontal advance to the next glyph
    pub advance: f32,
}

/// Packed sound (mono i16 PCM)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedSound {
    /// Asset ID (e.g., "jump", "explosion")
    pub id: String,
    pub data: Vec<i16>,
}

impl PackedSound {
    pub fn new(id: impl Into<String>, data: Vec<i16>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.data.len()
    }
}

/// Packed raw data (levels, dialogue, custom formats)
///
/// Opaque bytes the game interprets. Never uploaded; copied into guest
/// memory on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct PackedData {
    /// Asset ID (e.g., "level1", "dialogue_en")
    pub id: String,
    pub data: Vec<u8>,
}

impl PackedData {
    pub fn new(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}
