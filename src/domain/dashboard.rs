// Dashboard domain model - Graphs on a dashboard and saved presets
use super::chart::{ChartConfiguration, DEFAULT_CHART_HEIGHT};
use super::metric::MetricCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NEW_GRAPH_HEIGHT: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The `days` days leading up to `end`.
    /// Range of `days` ending at `end`; `None` when the start would fall
    /// outside the representable date range.
    pub fn last_days(end: DateTime<Utc>, days: i64) -> Option<Self> {
        let span = chrono::TimeDelta::try_days(days)?;
        let start = end.checked_sub_signed(span)?;
        Some(Self { start, end })
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
    pub id: String,
    pub title: String,
    pub selected_devices: Vec<String>,
    pub selected_metrics: Vec<MetricCode>,
    pub chart_config: ChartConfiguration,
    #[serde(default)]
    pub custom_colors: BTreeMap<String, String>,
    #[serde(default = "default_expanded")]
    pub expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_height: Option<u32>,
}

fn default_expanded() -> bool {
    true
}

impl GraphConfig {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            selected_devices: Vec::new(),
            selected_metrics: vec![MetricCode::Temperature, MetricCode::Humidity, MetricCode::Power],
            chart_config: ChartConfiguration::default(),
            custom_colors: BTreeMap::new(),
            expanded: true,
            date_range: None,
            chart_height: None,
        }
    }

    pub fn effective_range(&self, dashboard_range: DateRange) -> DateRange {
        self.date_range.unwrap_or(dashboard_range)
    }

    pub fn height(&self) -> u32 {
        self.chart_height.unwrap_or(DEFAULT_CHART_HEIGHT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPreset {
    pub id: String,
    pub name: String,
    pub date_range: DateRange,
    pub graphs: Vec<GraphConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChartPreset {
    pub fn new(name: impl Into<String>, date_range: DateRange, graphs: Vec<GraphConfig>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("preset-{}", uuid::Uuid::new_v4()),
            name: name.into(),
            date_range,
            graphs,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied by `PresetRepository::update`.
#[derive(Debug, Clone, Default)]
pub struct PresetUpdate {
    pub name: Option<String>,
    pub date_range: Option<DateRange>,
    pub graphs: Option<Vec<GraphConfig>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub date_range: DateRange,
    pub graphs: Vec<GraphConfig>,
}

impl Dashboard {
    pub fn new(date_range: DateRange, graphs: Vec<GraphConfig>) -> Self {
        Self { date_range, graphs }
    }

    pub fn from_preset(preset: &ChartPreset) -> Self {
        Self::new(preset.date_range, preset.graphs.clone())
    }

    /// Append a graph with the default selections. It inherits the first
    /// graph's date range so new graphs line up with existing ones.
    pub fn add_graph(&mut self, id: impl Into<String>, default_devices: Vec<String>) -> &GraphConfig {
        let title = format!("Graph {}", self.graphs.len() + 1);
        let mut graph = GraphConfig::new(id, title);
        graph.selected_devices = default_devices;
        graph.date_range = Some(
            self.graphs
                .first()
                .and_then(|g| g.date_range)
                .unwrap_or(self.date_range),
        );
        graph.chart_height = Some(NEW_GRAPH_HEIGHT);
        self.graphs.push(graph);
        &self.graphs[self.graphs.len() - 1]
    }

    /// Remove a graph by id. The last remaining graph cannot be removed.
    pub fn remove_graph(&mut self, id: &str) -> bool {
        if self.graphs.len() <= 1 {
            return false;
        }
        let before = self.graphs.len();
        self.graphs.retain(|g| g.id != id);
        self.graphs.len() != before
    }

    pub fn graph_mut(&mut self, id: &str) -> Option<&mut GraphConfig> {
        self.graphs.iter_mut().find(|g| g.id == id)
    }
}
