use egui::{Color32, Vec2, vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the editor. Every field has a default so partial files are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Size of the editing surface used for previews when no window dictates it
    pub workspace_size: Vec2,
    /// Newly placed layers are fitted inside a square of this size
    pub max_initial_extent: f32,
    /// Extra reach, beyond half the stroke width, for clicking a stroke
    pub hit_tolerance: f32,
    /// Padding around a selected stroke's outline
    pub selection_padding: f32,
    /// Grab radius of resize and crop handles
    pub handle_radius: f32,
    pub brush_color: Color32,
    pub brush_width: f32,
    /// Fill behind everything in a composite
    pub background: Color32,
    pub presets_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            workspace_size: vec2(1024.0, 768.0),
            max_initial_extent: 400.0,
            hit_tolerance: 4.0,
            selection_padding: 6.0,
            handle_radius: 8.0,
            brush_color: Color32::from_rgb(220, 40, 40),
            brush_width: 5.0,
            background: Color32::WHITE,
            presets_path: PathBuf::from("presets.json"),
            output_dir: PathBuf::from("generated"),
        }
    }
}

impl EditorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Falls back to defaults when the file is missing or broken
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(ConfigError::Read(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {}", path.display(), err);
                Self::default()
            }
        }
    }
}
