use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use super::{Preset, PresetResult, PresetStorage};

/// Keeps presets for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryPresetStorage {
    presets: Vec<Preset>,
}

impl MemoryPresetStorage {
    pub fn with_presets(presets: Vec<Preset>) -> Self {
        Self { presets }
    }
}

impl PresetStorage for MemoryPresetStorage {
    fn load(&self) -> PresetResult<Vec<Preset>> {
        Ok(self.presets.clone())
    }

    fn store(&mut self, presets: &[Preset]) -> PresetResult<()> {
        self.presets = presets.to_vec();
        Ok(())
    }
}

/// Presets as a pretty-printed JSON array in one file
#[derive(Debug, Clone)]
pub struct JsonFilePresetStorage {
    path: PathBuf,
}

impl JsonFilePresetStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PresetStorage for JsonFilePresetStorage {
    /// A missing file is an empty list
    fn load(&self) -> PresetResult<Vec<Preset>> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No preset file at {}", self.path.display());
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn store(&mut self, presets: &[Preset]) -> PresetResult<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(presets)?;
        fs::write(&self.path, json)?;
        debug!("Wrote {} presets to {}", presets.len(), self.path.display());
        Ok(())
    }
}
