// Repository trait for saved chart presets
use crate::domain::dashboard::{ChartPreset, PresetUpdate};

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("Preset not found: {0}")]
    NotFound(String),

    #[error("Preset name must not be empty")]
    EmptyName,

    #[error("Preset storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preset serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait PresetRepository: Send + Sync {
    /// Insert the preset, replacing any stored preset with the same id
    fn save(&self, preset: &ChartPreset) -> Result<(), PresetError>;

    /// All stored presets; unreadable storage yields an empty list
    fn list(&self) -> Vec<ChartPreset>;

    fn get(&self, id: &str) -> Option<ChartPreset> {
        self.list().into_iter().find(|p| p.id == id)
    }

    fn delete(&self, id: &str) -> Result<(), PresetError>;

    /// Apply a partial update and bump `updated_at`
    fn update(&self, id: &str, update: PresetUpdate) -> Result<ChartPreset, PresetError>;
}
