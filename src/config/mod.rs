// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the song screen.
//!
//! This module provides the screen geometry, split threshold and song
//! lookup settings handed to a song when it is loaded. Settings files are
//! YAML or TOML, chosen by extension; every field has a default.

pub mod watcher;

pub use watcher::{ConfigEvent, ConfigWatcher};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::{FitStrategy, Viewport};

/// Settings file names probed by [`EngineConfig::discover`], in order
pub const SETTINGS_FILES: &[&str] = &["settings.yaml", "settings.yml", "settings.toml"];

/// Settings file syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML
    Yaml,
    /// TOML
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Root configuration for the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Step used by the operator's font increase/decrease controls
    #[serde(default = "default_font_size_step")]
    pub font_size_step: u16,
    /// Font-fit algorithm
    #[serde(default)]
    pub fit_strategy: FitStrategy,
    /// Directory searched when a song is not found as given
    #[serde(default = "default_songs_dir")]
    pub songs_dir: PathBuf,
    /// Main (projected) screen geometry and split threshold
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Operator preview thumbnail geometry
    #[serde(default)]
    pub preview: PreviewConfig,
}

fn default_font_size_step() -> u16 {
    5
}
fn default_songs_dir() -> PathBuf {
    PathBuf::from("songs")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            font_size_step: default_font_size_step(),
            fit_strategy: FitStrategy::default(),
            songs_dir: default_songs_dir(),
            viewport: ViewportConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration file, YAML or TOML by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Yaml) => Self::from_yaml(&contents),
            Some(ConfigFormat::Toml) => Self::from_toml(&contents),
            None => bail!("Unsupported config file extension: {:?}", path),
        }
    }

    /// Load the first settings file found in `dir`, or defaults.
    ///
    /// A settings file that fails to parse is logged and ignored.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Self {
        for name in SETTINGS_FILES {
            let path = dir.as_ref().join(name);
            if !path.is_file() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => return config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring settings file");
                    return Self::default();
                }
            }
        }
        Self::default()
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize configuration to TOML")
    }

    /// Save configuration, YAML or TOML by extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Toml) => self.to_toml()?,
            _ => self.to_yaml()?,
        };
        fs::write(path, text).with_context(|| format!("Failed to write config file: {:?}", path))
    }
}

/// Main screen geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewportConfig {
    /// Width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Blocks whose fit falls below this size are split in two
    #[serde(default = "default_font_size_for_split")]
    pub font_size_for_split: u16,
}

fn default_width() -> u32 {
    1920
}
fn default_height() -> u32 {
    1080
}
fn default_font_size_for_split() -> u16 {
    40
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            font_size_for_split: default_font_size_for_split(),
        }
    }
}

impl ViewportConfig {
    /// Geometry as a solver viewport
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

/// Preview thumbnail geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewConfig {
    /// Width in pixels
    #[serde(default = "default_preview_width")]
    pub width: u32,
    /// Height in pixels
    #[serde(default = "default_preview_height")]
    pub height: u32,
}

fn default_preview_width() -> u32 {
    320
}
fn default_preview_height() -> u32 {
    180
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: default_preview_width(),
            height: default_preview_height(),
        }
    }
}

impl PreviewConfig {
    /// Geometry as a solver viewport
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}
