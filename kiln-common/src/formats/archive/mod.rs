//! Kiln archive pack (`.kpak`)
//!
//! Bundles pre-parsed assets keyed by string id. Assets loaded through the
//! `rom_*` FFI are looked up here and go straight to device memory, never
//! through guest linear memory.
//!
//! # Layout
//! ```text
//! 0x00: magic "KPAK"
//! 0x04: version u16 (LE)
//! 0x06: bitcode-encoded ArchivePack
//! ```

mod types;

#[cfg(test)]
mod tests;

pub use types::*;

use std::path::Path;
use std::sync::OnceLock;

use bitcode::{Decode, Encode};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::FormatError;

/// Archive file magic
pub const ARCHIVE_MAGIC: &[u8; 4] = b"KPAK";

/// Current archive format version
pub const ARCHIVE_VERSION: u16 = 1;

/// Archive file extension
pub const ARCHIVE_EXT: &str = "kpak";

const PREAMBLE_SIZE: usize = 6;

/// Archive load/validation failures
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive too short: {0} bytes")]
    Truncated(usize),
    #[error("bad archive magic (expected KPAK)")]
    BadMagic,
    #[error("unsupported archive version {found} (this build reads {ARCHIVE_VERSION})")]
    UnsupportedVersion { found: u16 },
    #[error("archive body failed to decode: {0}")]
    Decode(String),
    #[error("{kind} '{id}' is invalid: {source}")]
    InvalidEntry {
        kind: &'static str,
        id: String,
        #[source]
        source: FormatError,
    },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Kiln archive pack
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct ArchivePack {
    pub textures: Vec<PackedTexture>,
    pub meshes: Vec<PackedMesh>,
    pub skeletons: Vec<PackedSkeleton>,
    pub keyframes: Vec<PackedKeyframes>,
    pub fonts: Vec<PackedFont>,
    pub sounds: Vec<PackedSound>,
    pub data: Vec<PackedData>,

    // Lookup indices, built on first access
    #[serde(skip)]
    #[bitcode(skip)]
    texture_index: OnceLock<HashMap<String, usize>>,

    #[serde(skip)]
    #[bitcode(skip)]
    mesh_index: OnceLock<HashMap<String, usize>>,

    #[serde(skip)]
    #[bitcode(skip)]
    skeleton_index: OnceLock<HashMap<String, usize>>,

    #[serde(skip)]
    #[bitcode(skip)]
    keyframes_index: OnceLock<HashMap<String, usize>>,

    #[serde(skip)]
    #[bitcode(skip)]
    font_index: OnceLock<HashMap<String, usize>>,

    #[serde(skip)]
    #[bitcode(skip)]
    sound_index: OnceLock<HashMap<String, usize>>,

    #[serde(skip)]
    #[bitcode(skip)]
    data_index: OnceLock<HashMap<String, usize>>,
}

impl ArchivePack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.asset_count() == 0
    }

    pub fn asset_count(&self) -> usize {
        self.textures.len()
            + self.meshes.len()
            + self.skeletons.len()
            + self.keyframes.len()
            + self.fonts.len()
            + self.sounds.len()
            + self.data.len()
    }

    pub fn find_texture(&self, id: &str) -> Option<&PackedTexture> {
        let index = self
            .texture_index
            .get_or_init(|| build_index(&self.textures, |t| &t.id));
        index.get(id).map(|&i| &self.textures[i])
    }

    pub fn find_mesh(&self, id: &str) -> Option<&PackedMesh> {
        let index = self
            .mesh_index
            .get_or_init(|| build_index(&self.meshes, |m| &m.id));
        index.get(id).map(|&i| &self.meshes[i])
    }

    pub fn find_skeleton(&self, id: &str) -> Option<&PackedSkeleton> {
        let index = self
            .skeleton_index
            .get_or_init(|| build_index(&self.skeletons, |s| &s.id));
        index.get(id).map(|&i| &self.skeletons[i])
    }

    pub fn find_keyframes(&self, id: &str) -> Option<&PackedKeyframes> {
        let index = self
            .keyframes_index
            .get_or_init(|| build_index(&self.keyframes, |k| &k.id));
        index.get(id).map(|&i| &self.keyframes[i])
    }

    pub fn find_font(&self, id: &str) -> Option<&PackedFont> {
        let index = self
            .font_index
            .get_or_init(|| build_index(&self.fonts, |f| &f.id));
        index.get(id).map(|&i| &self.fonts[i])
    }

    pub fn find_sound(&self, id: &str) -> Option<&PackedSound> {
        let index = self
            .sound_index
            .get_or_init(|| build_index(&self.sounds, |s| &s.id));
        index.get(id).map(|&i| &self.sounds[i])
    }

    pub fn find_data(&self, id: &str) -> Option<&PackedData> {
        let index = self
            .data_index
            .get_or_init(|| build_index(&self.data, |d| &d.id));
        index.get(id).map(|&i| &self.data[i])
    }

    /// Validate every entry and reject duplicate ids within a kind
    pub fn validate(&self) -> Result<(), ArchiveError> {
        check_unique("texture", &self.textures, |t| &t.id)?;
        check_unique("mesh", &self.meshes, |m| &m.id)?;
        check_unique("skeleton", &self.skeletons, |s| &s.id)?;
        check_unique("keyframes", &self.keyframes, |k| &k.id)?;
        check_unique("font", &self.fonts, |f| &f.id)?;
        check_unique("sound", &self.sounds, |s| &s.id)?;
        check_unique("data", &self.data, |d| &d.id)?;

        for t in &self.textures {
            t.validate().map_err(|e| invalid("texture", &t.id, e))?;
        }
        for m in &self.meshes {
            m.validate().map_err(|e| invalid("mesh", &m.id, e))?;
        }
        for s in &self.skeletons {
            s.validate().map_err(|e| invalid("skeleton", &s.id, e))?;
        }
        for k in &self.keyframes {
            k.block().map_err(|e| invalid("keyframes", &k.id, e))?;
        }
        for f in &self.fonts {
            f.validate().map_err(|e| invalid("font", &f.id, e))?;
        }
        Ok(())
    }

    /// Encode to archive bytes (preamble + bitcode body)
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = bitcode::encode(self);
        let mut bytes = Vec::with_capacity(PREAMBLE_SIZE + body.len());
        bytes.extend_from_slice(ARCHIVE_MAGIC);
        bytes.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        bytes
    }

    /// Decode archive bytes and validate the contents
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
        if bytes.len() < PREAMBLE_SIZE {
            return Err(ArchiveError::Truncated(bytes.len()));
        }
        if &bytes[0..4] != ARCHIVE_MAGIC {
            return Err(ArchiveError::BadMagic);
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != ARCHIVE_VERSION {
            return Err(ArchiveError::UnsupportedVersion { found: version });
        }
        let pack: ArchivePack = bitcode::decode(&bytes[PREAMBLE_SIZE..])
            .map_err(|e| ArchiveError::Decode(e.to_string()))?;
        pack.validate()?;
        Ok(pack)
    }

    /// Read and decode an archive file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Write the archive to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

fn invalid(kind: &'static str, id: &str, source: FormatError) -> ArchiveError {
    ArchiveError::InvalidEntry {
        kind,
        id: id.to_string(),
        source,
    }
}

fn check_unique<T, F>(kind: &'static str, items: &[T], get_id: F) -> Result<(), ArchiveError>
where
    F: Fn(&T) -> &String,
{
    let mut seen = hashbrown::HashSet::with_capacity(items.len());
    for item in items {
        let id = get_id(item);
        if !seen.insert(id.as_str()) {
            return Err(ArchiveError::DuplicateId {
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(())
}

/// Build a hash map index from a vector of items with string IDs
fn build_index<T, F>(items: &[T], get_id: F) -> HashMap<String, usize>
where
    F: Fn(&T) -> &String,
{
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (get_id(item).clone(), i))
        .collect()
}
