// Chart domain model - Configuration, series descriptors, merged rows and axis slots
use super::metric::MetricCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_TICK_COUNT: usize = 5;
pub const MIN_TICK_COUNT: usize = 2;
pub const MAX_TICK_COUNT: usize = 10;
pub const MIN_X_TICKS: usize = 1;
pub const MAX_X_TICKS: usize = 50;
pub const DEFAULT_OPACITY: f64 = 0.9;
pub const DEFAULT_CHART_HEIGHT: u32 = 320;
pub const MIN_CHART_HEIGHT: u32 = 200;
pub const MAX_CHART_HEIGHT: u32 = 800;
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Area,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Area => "area",
        }
    }
}

/// Per-metric Y axis customization. Absent fields fall back to the metric's
/// default range and the common tick count.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XAxisOverride {
    /// Target number of X labels; `None` selects the automatic banding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfiguration {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub show_legend: bool,
    pub show_grid: bool,
    pub enable_zoom: bool,
    pub multi_axis: bool,
    #[serde(rename = "normalizeData")]
    pub normalize: bool,
    #[serde(rename = "yAxisConfig")]
    pub y_axis: BTreeMap<MetricCode, AxisOverride>,
    #[serde(rename = "xAxisConfig")]
    pub x_axis: XAxisOverride,
    #[serde(rename = "commonTickCount")]
    pub tick_count: usize,
    pub hidden_series: BTreeSet<String>,
    pub custom_colors: BTreeMap<String, String>,
    pub series_opacity: BTreeMap<String, f64>,
}

impl Default for ChartConfiguration {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            show_legend: true,
            show_grid: true,
            enable_zoom: true,
            multi_axis: false,
            normalize: false,
            y_axis: BTreeMap::new(),
            x_axis: XAxisOverride::default(),
            tick_count: DEFAULT_TICK_COUNT,
            hidden_series: BTreeSet::new(),
            custom_colors: BTreeMap::new(),
            series_opacity: BTreeMap::new(),
        }
    }
}

impl ChartConfiguration {
    pub fn opacity_for(&self, key: &str) -> f64 {
        self.series_opacity
            .get(key)
            .copied()
            .filter(|o| o.is_finite())
            .map(|o| o.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_OPACITY)
    }

    pub fn is_hidden(&self, key: &str) -> bool {
        self.hidden_series.contains(key)
    }
}

/// Which Y axis a series is bound to before slot assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisId {
    Shared,
    Metric(MetricCode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDescriptor {
    pub key: String,
    pub name: String,
    pub metric: MetricCode,
    pub color: String,
    pub axis_id: AxisId,
    pub unit: String,
    pub hidden: bool,
    pub opacity: f64,
}

/// One series' contribution to a merged row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedCell {
    pub value: f64,
    /// Source value, kept only when `value` was normalized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<f64>,
    pub unit: String,
    pub metric: MetricCode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRow {
    pub timestamp: DateTime<Utc>,
    pub index: usize,
    pub label: String,
    pub cells: BTreeMap<String, MergedCell>,
}

impl MergedRow {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            index: 0,
            label: timestamp.format("%H:%M").to_string(),
            cells: BTreeMap::new(),
        }
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.cells.get(key).map(|c| c.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisPosition {
    InnerLeft,
    OuterLeft,
    InnerRight,
    OuterRight,
}

impl AxisPosition {
    /// Slots in assignment priority order.
    pub const ALL: [AxisPosition; 4] = [
        AxisPosition::InnerLeft,
        AxisPosition::OuterLeft,
        AxisPosition::InnerRight,
        AxisPosition::OuterRight,
    ];

    pub fn side(&self) -> AxisSide {
        match self {
            AxisPosition::InnerLeft | AxisPosition::OuterLeft => AxisSide::Left,
            AxisPosition::InnerRight | AxisPosition::OuterRight => AxisSide::Right,
        }
    }

    pub fn is_outer(&self) -> bool {
        matches!(self, AxisPosition::OuterLeft | AxisPosition::OuterRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    Mobile,
    Tablet,
    Desktop,
}

impl ViewportClass {
    pub fn from_width(width: u32) -> Self {
        if width < 640 {
            ViewportClass::Mobile
        } else if width < 1024 {
            ViewportClass::Tablet
        } else {
            ViewportClass::Desktop
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisGeometry {
    pub width: u32,
    pub label_offset: u32,
    pub tick_dx: i32,
    pub font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSlot {
    pub position: AxisPosition,
    pub metric: Option<MetricCode>,
    pub domain: Option<(f64, f64)>,
    pub ticks: Vec<f64>,
    pub geometry: AxisGeometry,
    pub color: String,
    pub label: String,
}

impl AxisSlot {
    /// Unused slots are still laid out (transparent) to keep geometry fixed.
    pub fn is_placeholder(&self) -> bool {
        self.metric.is_none()
    }
}

/// Metric that did not get a slot of its own. It is plotted against its own
/// domain and borrows `host`'s axis for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowBinding {
    pub metric: MetricCode,
    pub host: AxisPosition,
    pub domain: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum XTickInterval {
    /// Skip this many labels between two rendered ones.
    Every(usize),
    PreserveStartEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub slots: [AxisSlot; 4],
    pub overflow: Vec<OverflowBinding>,
    pub grid_reference: Option<Vec<f64>>,
    pub x_interval: XTickInterval,
    pub margins: Margins,
    pub viewport: ViewportClass,
}

impl AxisLayout {
    pub fn slot(&self, position: AxisPosition) -> &AxisSlot {
        &self.slots[AxisPosition::ALL
            .iter()
            .position(|p| *p == position)
            .unwrap_or(0)]
    }

    pub fn slot_for_metric(&self, metric: &MetricCode) -> Option<&AxisSlot> {
        self.slots.iter().find(|s| s.metric.as_ref() == Some(metric))
    }

    /// Domain used to scale a metric's values: its slot, or its overflow
    /// binding when the metric did not get a slot.
    pub fn domain_for_metric(&self, metric: &MetricCode) -> Option<(f64, f64)> {
        self.slot_for_metric(metric)
            .and_then(|s| s.domain)
            .or_else(|| {
                self.overflow
                    .iter()
                    .find(|o| &o.metric == metric)
                    .map(|o| o.domain)
            })
    }

    pub fn populated(&self) -> impl Iterator<Item = &AxisSlot> {
        self.slots.iter().filter(|s| !s.is_placeholder())
    }
}

/// Per-chart state. Every chart on a dashboard owns its own session, so one
/// chart's overrides never leak into another.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSession {
    pub config: ChartConfiguration,
    /// First-seen metric order driving slot assignment.
    pub metric_priority: Vec<MetricCode>,
    pub viewport_width: u32,
    pub chart_height: u32,
}

impl Default for ChartSession {
    fn default() -> Self {
        Self::new(ChartConfiguration::default())
    }
}

impl ChartSession {
    pub fn new(config: ChartConfiguration) -> Self {
        Self {
            config,
            metric_priority: Vec::new(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }

    pub fn viewport(&self) -> ViewportClass {
        ViewportClass::from_width(self.viewport_width)
    }
}
