// JSON file preset store - All presets kept as one array in the data directory
use crate::application::preset_repository::{PresetError, PresetRepository};
use crate::domain::dashboard::{ChartPreset, PresetUpdate};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const STORAGE_KEY: &str = "chart-presets";

#[derive(Debug, Clone)]
pub struct JsonPresetStore {
    path: PathBuf,
}

impl JsonPresetStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STORAGE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, presets: &[ChartPreset]) -> Result<(), PresetError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(presets)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

impl PresetRepository for JsonPresetStore {
    fn save(&self, preset: &ChartPreset) -> Result<(), PresetError> {
        if preset.name.trim().is_empty() {
            return Err(PresetError::EmptyName);
        }

        let mut presets = self.list();
        match presets.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset.clone(),
            None => presets.push(preset.clone()),
        }
        self.write_all(&presets)?;

        tracing::info!("Saved preset '{}' ({})", preset.name, preset.id);
        Ok(())
    }

    /// Missing or unreadable storage yields an empty list.
    fn list(&self) -> Vec<ChartPreset> {
        let body = match std::fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!("Failed to read presets from {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&body) {
            Ok(presets) => presets,
            Err(e) => {
                tracing::error!("Failed to parse presets in {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    fn delete(&self, id: &str) -> Result<(), PresetError> {
        let mut presets = self.list();
        let before = presets.len();
        presets.retain(|p| p.id != id);
        if presets.len() == before {
            return Err(PresetError::NotFound(id.to_string()));
        }
        self.write_all(&presets)
    }

    fn update(&self, id: &str, update: PresetUpdate) -> Result<ChartPreset, PresetError> {
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(PresetError::EmptyName);
        }

        let mut presets = self.list();
        let preset = presets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PresetError::NotFound(id.to_string()))?;

        if let Some(name) = update.name {
            preset.name = name;
        }
        if let Some(range) = update.date_range {
            preset.date_range = range;
        }
        if let Some(graphs) = update.graphs {
            preset.graphs = graphs;
        }
        preset.updated_at = Utc::now();

        let updated = preset.clone();
        self.write_all(&presets)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartType;
    use crate::domain::dashboard::{DateRange, GraphConfig};
    use crate::domain::metric::MetricCode;
    use chrono::TimeZone;

    fn range() -> DateRange {
        DateRange::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap(),
        )
    }

    fn graph() -> GraphConfig {
        let mut graph = GraphConfig::new("graph-1", "Floor 3");
        graph.selected_devices = vec!["office-power-004".to_string()];
        graph.selected_metrics = vec![MetricCode::Power, MetricCode::Co2];
        graph.chart_config.chart_type = ChartType::Area;
        graph.chart_config.normalize = true;
        graph
    }

    #[test]
    fn test_missing_file_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPresetStore::new(dir.path());
        assert!(store.list().is_empty());
        assert!(store.get("preset-x").is_none());
    }

    #[test]
    fn test_round_trip_restores_dates_and_graphs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPresetStore::new(dir.path());
        let preset = ChartPreset::new("Weekly power", range(), vec![graph()]);
        store.save(&preset).unwrap();

        let loaded = store.get(&preset.id).unwrap();
        assert_eq!(loaded, preset);
        assert_eq!(loaded.date_range.start, range().start);
        assert_eq!(loaded.graphs[0].chart_config.chart_type, ChartType::Area);
    }

    #[test]
    fn test_save_replaces_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPresetStore::new(dir.path());
        let mut preset = ChartPreset::new("First", range(), vec![]);
        store.save(&preset).unwrap();
        store.save(&ChartPreset::new("Second", range(), vec![])).unwrap();

        preset.name = "First (edited)".to_string();
        store.save(&preset).unwrap();

        let names: Vec<String> = store.list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["First (edited)", "Second"]);
    }

    #[test]
    fn test_update_bumps_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPresetStore::new(dir.path());
        let preset = ChartPreset::new("Morning", range(), vec![]);
        store.save(&preset).unwrap();

        let updated = store
            .update(
                &preset.id,
                PresetUpdate {
                    name: Some("Evening".to_string()),
                    ..PresetUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Evening");
        assert_eq!(updated.created_at, preset.created_at);
        assert!(updated.updated_at >= preset.updated_at);
        assert_eq!(store.get(&preset.id).unwrap().name, "Evening");

        assert!(matches!(
            store.update("preset-missing", PresetUpdate::default()),
            Err(PresetError::NotFound(_))
        ));
        assert!(matches!(
            store.update(
                &preset.id,
                PresetUpdate {
                    name: Some("  ".to_string()),
                    ..PresetUpdate::default()
                }
            ),
            Err(PresetError::EmptyName)
        ));
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPresetStore::new(dir.path());
        let preset = ChartPreset::new("Temp", range(), vec![]);
        store.save(&preset).unwrap();

        store.delete(&preset.id).unwrap();
        assert!(store.list().is_empty());
        assert!(matches!(store.delete(&preset.id), Err(PresetError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_storage_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPresetStore::new(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.list().is_empty());
    }
}
