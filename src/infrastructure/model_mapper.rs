// Chart model mapper - Renderer-agnostic JSON view of a recomputed chart
use crate::application::axis_layout::x_label_indices;
use crate::application::chart_service::{format_tooltip, series_style, ChartModel, LegendEntry, SeriesStyle};
use crate::domain::chart::{AxisLayout, ChartType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView {
    pub key: String,
    pub name: String,
    pub metric: String,
    pub unit: String,
    pub color: String,
    pub hidden: bool,
    pub style: SeriesStyle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub values: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub originals: BTreeMap<String, f64>,
    pub tooltips: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub title: String,
    pub chart_type: ChartType,
    pub normalized: bool,
    pub multi_axis: bool,
    pub show_grid: bool,
    pub show_legend: bool,
    pub height: u32,
    pub series: Vec<SeriesView>,
    pub rows: Vec<RowView>,
    pub axes: AxisLayout,
    pub x_label_indices: Vec<usize>,
    pub legend: Vec<LegendEntry>,
}

pub fn to_view(model: &ChartModel) -> ChartView {
    let config = &model.config;

    let series = model
        .descriptors
        .iter()
        .map(|d| SeriesView {
            key: d.key.clone(),
            name: d.name.clone(),
            metric: d.metric.to_string(),
            unit: d.unit.clone(),
            color: d.color.clone(),
            hidden: d.hidden,
            style: series_style(config.chart_type, d.opacity),
        })
        .collect();

    let rows = model
        .rows
        .iter()
        .map(|row| RowView {
            timestamp: row.timestamp,
            label: row.label.clone(),
            values: row.cells.iter().map(|(k, c)| (k.clone(), c.value)).collect(),
            originals: row
                .cells
                .iter()
                .filter_map(|(k, c)| c.original.map(|o| (k.clone(), o)))
                .collect(),
            tooltips: model
                .visible_series()
                .filter_map(|d| format_tooltip(row, d, config.normalize))
                .collect(),
        })
        .collect();

    ChartView {
        title: model.title.clone(),
        chart_type: config.chart_type,
        normalized: config.normalize,
        multi_axis: config.multi_axis,
        show_grid: config.show_grid,
        show_legend: config.show_legend,
        height: model.chart_height,
        series,
        rows,
        axes: model.layout.clone(),
        x_label_indices: x_label_indices(model.rows.len(), model.layout.x_interval),
        legend: model.legend.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_service::ChartService;
    use crate::domain::chart::ChartSession;
    use crate::domain::metric::{Locale, MetricCode};
    use crate::domain::telemetry::{DataPoint, RawSeries};
    use chrono::TimeZone;

    fn model(normalize: bool) -> ChartModel {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let mut svc = ChartService::new("Lobby", ChartSession::default(), Locale::En);
        svc.set_data(vec![
            RawSeries::new("env", MetricCode::Humidity, vec![DataPoint::new(t0, 55.0)]),
            RawSeries::new("env", MetricCode::Co2, vec![DataPoint::new(t0, 800.0)]),
        ]);
        svc.set_normalize(normalize);
        svc.recompute()
    }

    #[test]
    fn test_view_json_shape() {
        let json = serde_json::to_value(to_view(&model(false))).unwrap();

        assert_eq!(json["title"], "Lobby");
        assert_eq!(json["chartType"], "line");
        assert_eq!(json["multiAxis"], true);
        assert_eq!(json["series"][1]["metric"], "co2");
        assert_eq!(json["rows"][0]["label"], "09:30");
        assert_eq!(json["rows"][0]["values"]["env_co2"], 800.0);
        assert!(json["rows"][0].get("originals").is_none());
        assert_eq!(json["axes"]["slots"].as_array().unwrap().len(), 4);
        assert_eq!(json["axes"]["slots"][0]["position"], "innerLeft");
    }

    #[test]
    fn test_normalized_view_keeps_originals() {
        let view = to_view(&model(true));
        assert!(view.normalized);
        assert_eq!(view.rows[0].originals["env_humidity"], 55.0);
        assert_eq!(view.rows[0].values["env_humidity"], 50.0);
        assert_eq!(view.rows[0].tooltips[0], "env - Humidity: 55 % (50%)");
    }
}
