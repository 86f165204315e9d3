//! Host configuration (`config.toml`)
//!
//! ```toml
//! [memory]
//! ram_limit = 4194304
//! vram_budget = 4194304
//!
//! [session]
//! seed = 42
//! player_count = 2
//!
//! [rollback]
//! check_distance = 8
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::device::DeviceBudgets;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub rollback: RollbackConfig,
}

/// Guest RAM limit and device region budgets, in bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_ram_limit")]
    pub ram_limit: usize,
    #[serde(default = "default_vram_budget")]
    pub vram_budget: usize,
    #[serde(default = "default_skeleton_budget")]
    pub skeleton_budget: usize,
    #[serde(default = "default_keyframe_budget")]
    pub keyframe_budget: usize,
    #[serde(default = "default_audio_budget")]
    pub audio_budget: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// RNG seed shared by every peer
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_player_count")]
    pub player_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollbackConfig {
    /// Ticks between rollback self-checks (0 disables)
    #[serde(default)]
    pub check_distance: usize,
}

fn default_ram_limit() -> usize {
    kiln_core::DEFAULT_RAM_LIMIT
}
fn default_vram_budget() -> usize {
    DeviceBudgets::default().video
}
fn default_skeleton_budget() -> usize {
    DeviceBudgets::default().skeleton
}
fn default_keyframe_budget() -> usize {
    DeviceBudgets::default().keyframe
}
fn default_audio_budget() -> usize {
    DeviceBudgets::default().audio
}
fn default_player_count() -> u32 {
    1
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            ram_limit: default_ram_limit(),
            vram_budget: default_vram_budget(),
            skeleton_budget: default_skeleton_budget(),
            keyframe_budget: default_keyframe_budget(),
            audio_budget: default_audio_budget(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            player_count: default_player_count(),
        }
    }
}

impl MemoryConfig {
    pub fn device_budgets(&self) -> DeviceBudgets {
        DeviceBudgets {
            video: self.vram_budget,
            skeleton: self.skeleton_budget,
            keyframe: self.keyframe_budget,
            audio: self.audio_budget,
        }
    }
}

/// Platform config directory
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "kiln", "kiln").map(|dirs| dirs.config_dir().to_path_buf())
}

impl HostConfig {
    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load `explicit`, else `config.toml` in the platform config dir, else defaults
    ///
    /// An explicit path must exist; a missing platform file is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match config_dir().map(|dir| dir.join("config.toml")) {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write the config as TOML
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }
}
