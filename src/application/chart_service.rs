// Chart service - Per-chart session state, mutation operations and recompute
use crate::application::axis_layout::{self, LayoutInput};
use crate::application::merger;
use crate::application::series_resolver::{self, distinct_metrics, uses_multi_axis};
use crate::domain::chart::{
    AxisLayout, AxisOverride, ChartConfiguration, ChartSession, ChartType, MergedRow,
    SeriesDescriptor, MAX_CHART_HEIGHT, MAX_TICK_COUNT, MAX_X_TICKS, MIN_CHART_HEIGHT, MIN_TICK_COUNT,
    MIN_X_TICKS,
};
use crate::domain::metric::{Locale, MetricCode};
use crate::domain::telemetry::RawSeries;
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ChartError {
    #[error("Unknown series: {0}")]
    UnknownSeries(String),

    #[error("Invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("Opacity {0} is outside 0..=1")]
    InvalidOpacity(f64),

    #[error("Tick count {0} is outside 2..=10")]
    InvalidTickCount(usize),

    #[error("X label target {0} is outside 1..=50")]
    InvalidXTicks(usize),

    #[error("Axis range for {metric} is empty: min {min} >= max {max}")]
    InvalidAxisRange { metric: MetricCode, min: f64, max: f64 },

    #[error("Chart height {0} is outside 200..=800")]
    InvalidHeight(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub key: String,
    pub label: String,
    pub color: String,
    pub hidden: bool,
}

/// Stroke and fill styling for one series under the chart's render mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStyle {
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
}

pub fn series_style(chart_type: ChartType, opacity: f64) -> SeriesStyle {
    let fill_factor = match chart_type {
        ChartType::Area => 1.0,
        ChartType::Bar => 0.8,
        ChartType::Line => 0.7,
    };
    SeriesStyle {
        stroke_width: if chart_type == ChartType::Line { 1.5 } else { 1.0 },
        stroke_opacity: opacity,
        fill_opacity: opacity * fill_factor,
    }
}

/// Tooltip line for one series at one row, `None` when the series has no
/// point there.
pub fn format_tooltip(row: &MergedRow, descriptor: &SeriesDescriptor, normalize: bool) -> Option<String> {
    let cell = row.cells.get(&descriptor.key)?;
    let text = match (normalize, cell.original) {
        (true, Some(original)) => format!(
            "{} {} ({}%)",
            original.round(),
            cell.unit,
            cell.value.round()
        ),
        _ => format!("{} {}", cell.value.round(), cell.unit),
    };
    Some(format!("{}: {}", descriptor.name, text.trim_end()))
}

/// Renderer-agnostic result of one recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub title: String,
    pub config: ChartConfiguration,
    pub descriptors: Vec<SeriesDescriptor>,
    pub rows: Vec<MergedRow>,
    pub layout: AxisLayout,
    pub legend: Vec<LegendEntry>,
    pub chart_height: u32,
}

impl ChartModel {
    pub fn visible_series(&self) -> impl Iterator<Item = &SeriesDescriptor> {
        self.descriptors.iter().filter(|d| !d.hidden)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Owns one chart's session and its current raw series. Every query result
/// is recomputed from scratch, so the service can be re-run on any trigger.
#[derive(Debug, Clone)]
pub struct ChartService {
    title: String,
    session: ChartSession,
    series: Vec<RawSeries>,
    locale: Locale,
}

impl ChartService {
    pub fn new(title: impl Into<String>, session: ChartSession, locale: Locale) -> Self {
        Self {
            title: title.into(),
            session,
            series: Vec::new(),
            locale,
        }
    }

    pub fn session(&self) -> &ChartSession {
        &self.session
    }

    pub fn config(&self) -> &ChartConfiguration {
        &self.session.config
    }

    pub fn series(&self) -> &[RawSeries] {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut Vec<RawSeries> {
        &mut self.series
    }

    pub fn set_data(&mut self, series: Vec<RawSeries>) {
        self.series = series;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    fn ensure_known(&self, key: &str) -> Result<(), ChartError> {
        if self.series.iter().any(|s| s.key() == key) {
            Ok(())
        } else {
            Err(ChartError::UnknownSeries(key.to_string()))
        }
    }

    /// Flip a series between hidden and shown. Returns whether it is now hidden.
    pub fn toggle_visibility(&mut self, key: &str) -> Result<bool, ChartError> {
        self.ensure_known(key)?;
        let hidden = &mut self.session.config.hidden_series;
        if hidden.remove(key) {
            Ok(false)
        } else {
            hidden.insert(key.to_string());
            Ok(true)
        }
    }

    pub fn set_color(&mut self, key: &str, color: &str) -> Result<(), ChartError> {
        self.ensure_known(key)?;
        if !is_hex_color(color) {
            return Err(ChartError::InvalidColor(color.to_string()));
        }
        self.session
            .config
            .custom_colors
            .insert(key.to_string(), color.to_ascii_lowercase());
        Ok(())
    }

    pub fn set_opacity(&mut self, key: &str, opacity: f64) -> Result<(), ChartError> {
        self.ensure_known(key)?;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ChartError::InvalidOpacity(opacity));
        }
        self.session
            .config
            .series_opacity
            .insert(key.to_string(), opacity);
        Ok(())
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.session.config.normalize = normalize;
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.session.config.chart_type = chart_type;
    }

    pub fn set_show_grid(&mut self, show: bool) {
        self.session.config.show_grid = show;
    }

    pub fn set_show_legend(&mut self, show: bool) {
        self.session.config.show_legend = show;
    }

    pub fn set_viewport(&mut self, width: u32) {
        self.session.viewport_width = width;
    }

    pub fn set_chart_height(&mut self, height: u32) -> Result<(), ChartError> {
        if !(MIN_CHART_HEIGHT..=MAX_CHART_HEIGHT).contains(&height) {
            return Err(ChartError::InvalidHeight(height));
        }
        self.session.chart_height = height;
        Ok(())
    }

    pub fn set_axis_override(&mut self, metric: MetricCode, axis: AxisOverride) -> Result<(), ChartError> {
        if let (Some(min), Some(max)) = (axis.min, axis.max) {
            if !(min < max) {
                return Err(ChartError::InvalidAxisRange { metric, min, max });
            }
        }
        if let Some(ticks) = axis.ticks {
            if !(MIN_TICK_COUNT..=MAX_TICK_COUNT).contains(&ticks) {
                return Err(ChartError::InvalidTickCount(ticks));
            }
        }
        self.session.config.y_axis.insert(metric, axis);
        Ok(())
    }

    pub fn clear_axis_override(&mut self, metric: &MetricCode) {
        self.session.config.y_axis.remove(metric);
    }

    pub fn set_tick_count(&mut self, count: usize) -> Result<(), ChartError> {
        if !(MIN_TICK_COUNT..=MAX_TICK_COUNT).contains(&count) {
            return Err(ChartError::InvalidTickCount(count));
        }
        self.session.config.tick_count = count;
        Ok(())
    }

    pub fn set_x_ticks(&mut self, ticks: Option<usize>) -> Result<(), ChartError> {
        if let Some(target) = ticks.filter(|t| !(MIN_X_TICKS..=MAX_X_TICKS).contains(t)) {
            return Err(ChartError::InvalidXTicks(target));
        }
        self.session.config.x_axis.ticks = ticks;
        Ok(())
    }

    /// Run priority update, resolve, merge and layout from scratch.
    pub fn recompute(&mut self) -> ChartModel {
        let observed = distinct_metrics(self.series.iter().map(|s| &s.metric));
        self.session.metric_priority =
            series_resolver::update_metric_priority(&self.session.metric_priority, &observed);

        let config = &self.session.config;
        let descriptors = series_resolver::resolve(&self.series, config, self.locale);
        let rows = merger::merge(&self.series, &descriptors, config.normalize);

        let layout = axis_layout::layout(&LayoutInput {
            descriptors: &descriptors,
            metric_priority: &self.session.metric_priority,
            overrides: &config.y_axis,
            tick_count: config.tick_count,
            viewport_width: self.session.viewport_width,
            normalize: config.normalize,
            row_count: rows.len(),
            x_axis: config.x_axis,
            locale: self.locale,
        });

        let mut snapshot = config.clone();
        snapshot.multi_axis = uses_multi_axis(
            descriptors.iter().filter(|d| !d.hidden).map(|d| &d.metric),
            config.normalize,
        );

        let legend = descriptors
            .iter()
            .map(|d| LegendEntry {
                key: d.key.clone(),
                label: if d.unit.is_empty() {
                    d.name.clone()
                } else {
                    format!("{} ({})", d.name, d.unit)
                },
                color: d.color.clone(),
                hidden: d.hidden,
            })
            .collect();

        tracing::debug!(
            "Recomputed chart '{}': {} series, {} rows, {} populated axes",
            self.title,
            descriptors.len(),
            rows.len(),
            layout.populated().count()
        );

        ChartModel {
            title: self.title.clone(),
            config: snapshot,
            descriptors,
            rows,
            layout,
            legend,
            chart_height: self.session.chart_height,
        }
    }
}
