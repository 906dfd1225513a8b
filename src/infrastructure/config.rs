use crate::domain::chart::{
    DEFAULT_CHART_HEIGHT, DEFAULT_TICK_COUNT, DEFAULT_VIEWPORT_WIDTH, MAX_CHART_HEIGHT,
    MAX_TICK_COUNT, MIN_CHART_HEIGHT, MIN_TICK_COUNT,
};
use crate::application::refresh_service::{MAX_REFRESH_SECS, MIN_REFRESH_SECS};
use crate::domain::device::FacilityType;
use crate::domain::metric::Locale;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard";
pub const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub locale: Locale,
    pub tick_count: usize,
    pub refresh_interval_secs: u64,
    pub sampling_interval_minutes: u32,
    pub facility: FacilityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    pub viewport_width: u32,
    pub chart_height: u32,
    pub seed: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            tick_count: DEFAULT_TICK_COUNT,
            refresh_interval_secs: 5,
            sampling_interval_minutes: 5,
            facility: FacilityType::Office,
            storage_dir: None,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
            seed: 42,
        }
    }
}

impl DashboardSettings {
    /// Directory holding presets and exports.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("energy-dashboard")
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(MIN_TICK_COUNT..=MAX_TICK_COUNT).contains(&self.tick_count) {
            anyhow::bail!("tick_count {} is outside 2..=10", self.tick_count);
        }
        if !(MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&self.refresh_interval_secs) {
            anyhow::bail!(
                "refresh_interval_secs {} is outside 1..=60",
                self.refresh_interval_secs
            );
        }
        if !(MIN_CHART_HEIGHT..=MAX_CHART_HEIGHT).contains(&self.chart_height) {
            anyhow::bail!("chart_height {} is outside 200..=800", self.chart_height);
        }
        if self.sampling_interval_minutes == 0 {
            anyhow::bail!("sampling_interval_minutes must be positive");
        }
        Ok(())
    }
}

/// Load settings from `config/dashboard.{toml,..}` (optional) with
/// `DASHBOARD__*` environment overrides on top of the defaults.
pub fn load_settings() -> anyhow::Result<DashboardSettings> {
    load_settings_from(DEFAULT_CONFIG_PATH)
}

pub fn load_settings_from(path: impl AsRef<Path>) -> anyhow::Result<DashboardSettings> {
    let path = path.as_ref();
    let settings = config::Config::builder()
        .add_source(config::File::with_name(&path.to_string_lossy()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

    let settings: DashboardSettings = settings
        .try_deserialize()
        .context("Invalid dashboard configuration")?;
    settings.validate()?;
    Ok(settings)
}

/// Write the default settings as TOML, refusing to clobber an existing file.
pub fn write_default_config(path: impl AsRef<Path>) -> anyhow::Result<PathBuf> {
    let path = path.as_ref().with_extension("toml");
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let body = toml::to_string_pretty(&DashboardSettings::default())?;
    std::fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(dir.path().join("absent")).unwrap();
        assert_eq!(settings.tick_count, DEFAULT_TICK_COUNT);
        assert_eq!(settings.locale, Locale::En);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(
            &path,
            "locale = \"ja\"\ntick_count = 7\nfacility = \"factory\"\nstorage_dir = \"/tmp/presets\"\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path().join("dashboard")).unwrap();
        assert_eq!(settings.locale, Locale::Ja);
        assert_eq!(settings.tick_count, 7);
        assert_eq!(settings.facility, FacilityType::Factory);
        assert_eq!(settings.storage_dir(), PathBuf::from("/tmp/presets"));
        assert_eq!(settings.refresh_interval_secs, 5);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dashboard.toml"), "refresh_interval_secs = 120\n").unwrap();
        assert!(load_settings_from(dir.path().join("dashboard")).is_err());
    }

    #[test]
    fn test_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config").join("dashboard");

        let written = write_default_config(&target).unwrap();
        assert!(written.ends_with("dashboard.toml"));
        assert_eq!(load_settings_from(&target).unwrap(), DashboardSettings::default());
        assert!(write_default_config(&target).is_err());
    }
}
