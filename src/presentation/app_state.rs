// Application state shared by command handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::data_source::SensorDataSource;
use crate::application::preset_repository::PresetRepository;
use crate::infrastructure::config::DashboardSettings;
use crate::infrastructure::mock_source::MockDataSource;
use crate::infrastructure::preset_store::JsonPresetStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: DashboardSettings,
    pub source: Arc<dyn SensorDataSource>,
    pub dashboard_service: DashboardService,
    pub presets: Arc<dyn PresetRepository>,
}

impl AppState {
    pub fn new(settings: DashboardSettings) -> Self {
        let source: Arc<dyn SensorDataSource> =
            Arc::new(MockDataSource::new(settings.facility, settings.seed));
        let presets: Arc<dyn PresetRepository> =
            Arc::new(JsonPresetStore::new(settings.storage_dir()));
        let dashboard_service = DashboardService::new(
            source.clone(),
            settings.locale,
            settings.sampling_interval_minutes,
            settings.viewport_width,
        );

        Self {
            settings,
            source,
            dashboard_service,
            presets,
        }
    }
}
