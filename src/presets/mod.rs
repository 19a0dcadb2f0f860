//! Named prompt snippets the user can drop into the prompt field.

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

mod persistence;

pub use persistence::{JsonFilePresetStorage, MemoryPresetStorage};

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to access preset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid preset data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no preset with id {0}")]
    UnknownPreset(Uuid),

    #[error("preset name must not be empty")]
    EmptyName,
}

pub type PresetResult<T> = Result<T, PresetError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: Uuid,
    pub name: String,
    pub text: String,
}

/// Where presets are kept between runs
pub trait PresetStorage {
    fn load(&self) -> PresetResult<Vec<Preset>>;
    fn store(&mut self, presets: &[Preset]) -> PresetResult<()>;
}

/// In-memory list of presets, written through to `S` on every change.
///
/// A failed write leaves the list as it was.
#[derive(Debug)]
pub struct PresetStore<S: PresetStorage> {
    storage: S,
    presets: Vec<Preset>,
}

impl<S: PresetStorage> PresetStore<S> {
    pub fn open(storage: S) -> PresetResult<Self> {
        let presets = storage.load()?;
        info!("📚 Loaded {} presets", presets.len());
        Ok(Self { storage, presets })
    }

    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, id: Uuid) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.id == id)
    }

    pub fn save(&mut self, name: &str, text: &str) -> PresetResult<Uuid> {
        let preset = Preset {
            id: Uuid::new_v4(),
            name: validated_name(name)?,
            text: text.to_owned(),
        };
        let id = preset.id;
        let mut next = self.presets.clone();
        next.push(preset);
        self.commit(next)?;
        info!("📚 Saved preset {}", id);
        Ok(id)
    }

    pub fn update(&mut self, id: Uuid, name: &str, text: &str) -> PresetResult<()> {
        let name = validated_name(name)?;
        let mut next = self.presets.clone();
        let preset = next
            .iter_mut()
            .find(|preset| preset.id == id)
            .ok_or(PresetError::UnknownPreset(id))?;
        preset.name = name;
        preset.text = text.to_owned();
        self.commit(next)
    }

    pub fn delete(&mut self, id: Uuid) -> PresetResult<Preset> {
        let index = self
            .presets
            .iter()
            .position(|preset| preset.id == id)
            .ok_or(PresetError::UnknownPreset(id))?;
        let mut next = self.presets.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        info!("📚 Deleted preset {}", id);
        Ok(removed)
    }

    fn commit(&mut self, next: Vec<Preset>) -> PresetResult<()> {
        self.storage.store(&next)?;
        self.presets = next;
        Ok(())
    }
}

fn validated_name(name: &str) -> PresetResult<String> {
    match name.trim() {
        "" => Err(PresetError::EmptyName),
        trimmed => Ok(trimmed.to_owned()),
    }
}
