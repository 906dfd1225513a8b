// Dashboard service - Use case for building dashboards of independent charts
use crate::application::chart_service::{is_hex_color, ChartModel, ChartService};
use crate::application::data_source::SensorDataSource;
use crate::domain::chart::ChartSession;
use crate::domain::dashboard::{ChartPreset, Dashboard, DateRange, GraphConfig};
use crate::domain::device::{Device, DeviceType};
use crate::domain::metric::{Locale, MetricCode};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;

const DEFAULT_DEVICE_TYPES: [DeviceType; 3] =
    [DeviceType::Environmental, DeviceType::Power, DeviceType::Hvac];

/// One dashboard graph after its data was fetched and its chart recomputed.
#[derive(Debug, Clone)]
pub struct RenderedGraph {
    pub graph_id: String,
    pub chart: ChartService,
    pub model: ChartModel,
}

#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn SensorDataSource>,
    locale: Locale,
    interval_minutes: u32,
    viewport_width: u32,
}

impl DashboardService {
    pub fn new(
        source: Arc<dyn SensorDataSource>,
        locale: Locale,
        interval_minutes: u32,
        viewport_width: u32,
    ) -> Self {
        Self {
            source,
            locale,
            interval_minutes,
            viewport_width,
        }
    }

    pub fn source(&self) -> Arc<dyn SensorDataSource> {
        self.source.clone()
    }

    /// First device of each of environmental, power and hvac; the first
    /// device at all when none of those exist.
    pub fn default_devices(devices: &[Device]) -> Vec<String> {
        let picked: Vec<String> = DEFAULT_DEVICE_TYPES
            .iter()
            .filter_map(|t| devices.iter().find(|d| d.device_type == *t))
            .map(|d| d.id.clone())
            .collect();
        if picked.is_empty() {
            devices.first().map(|d| vec![d.id.clone()]).unwrap_or_default()
        } else {
            picked
        }
    }

    /// Single-graph dashboard over the last day.
    pub async fn default_dashboard(&self, now: DateTime<Utc>) -> anyhow::Result<Dashboard> {
        let devices = self.source.list_devices().await?;
        let range = DateRange::last_days(now, 1).context("Current time is out of range")?;

        let mut graph = GraphConfig::new("graph-1", "Graph 1");
        graph.selected_devices = Self::default_devices(&devices);
        graph.date_range = Some(range);

        Ok(Dashboard::new(range, vec![graph]))
    }

    /// Rebuild a dashboard from a preset, dropping devices that no longer
    /// exist and falling back to defaults where a graph lost all of them.
    pub async fn restore_preset(&self, preset: &ChartPreset) -> anyhow::Result<Dashboard> {
        let devices = self.source.list_devices().await?;
        let mut dashboard = Dashboard::from_preset(preset);

        for graph in &mut dashboard.graphs {
            graph
                .selected_devices
                .retain(|id| devices.iter().any(|d| &d.id == id));
            if graph.selected_devices.is_empty() {
                tracing::warn!("No known devices left in graph {}, selecting defaults", graph.id);
                graph.selected_devices = Self::default_devices(&devices);
            }
            if graph.selected_metrics.is_empty() {
                graph.selected_metrics =
                    vec![MetricCode::Temperature, MetricCode::Humidity, MetricCode::Power];
            }
        }

        Ok(dashboard)
    }

    pub fn session_for(&self, graph: &GraphConfig) -> ChartSession {
        let mut config = graph.chart_config.clone();
        config
            .custom_colors
            .extend(graph.custom_colors.iter().map(|(k, v)| (k.clone(), v.clone())));
        config.custom_colors.retain(|key, color| {
            let valid = is_hex_color(color);
            if !valid {
                tracing::warn!("Dropping invalid color {:?} for {} in graph {}", color, key, graph.id);
            }
            valid
        });

        let mut session = ChartSession::new(config);
        session.viewport_width = self.viewport_width;
        session.chart_height = graph.height();
        session
    }

    pub async fn chart_for_graph(&self, graph: &GraphConfig, dashboard_range: DateRange) -> anyhow::Result<ChartService> {
        let range = graph.effective_range(dashboard_range);
        let series = self
            .source
            .fetch_series(
                &graph.selected_devices,
                &graph.selected_metrics,
                range,
                self.interval_minutes,
            )
            .await
            .with_context(|| format!("Failed to fetch data for graph {}", graph.id))?;

        let mut chart = ChartService::new(graph.title.clone(), self.session_for(graph), self.locale);
        chart.set_data(series);
        Ok(chart)
    }

    /// Fetch and recompute every graph. Graphs whose data cannot be fetched
    /// are logged and left out.
    pub async fn render_dashboard(&self, dashboard: &Dashboard) -> Vec<RenderedGraph> {
        let mut rendered = Vec::new();

        for graph in &dashboard.graphs {
            match self.chart_for_graph(graph, dashboard.date_range).await {
                Ok(mut chart) => {
                    let model = chart.recompute();
                    if model.is_empty() {
                        tracing::info!("Graph {} has no data for its selection", graph.id);
                    }
                    rendered.push(RenderedGraph {
                        graph_id: graph.id.clone(),
                        chart,
                        model,
                    });
                }
                Err(e) => {
                    tracing::error!("Error building graph {}: {:#}", graph.id, e);
                }
            }
        }

        rendered
    }
}
