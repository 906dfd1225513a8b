// Series resolver - Assigns key, name, color and axis to each raw series
use crate::domain::chart::{AxisId, ChartConfiguration, SeriesDescriptor};
use crate::domain::metric::{describe, Locale, MetricCode, PALETTE};
use crate::domain::telemetry::RawSeries;
use std::collections::HashSet;

/// Multi-axis mode applies when more than one distinct metric is present and
/// values are not normalized onto a shared 0-100 scale.
pub fn uses_multi_axis<'a>(metrics: impl IntoIterator<Item = &'a MetricCode>, normalize: bool) -> bool {
    let distinct: HashSet<&MetricCode> = metrics.into_iter().collect();
    distinct.len() > 1 && !normalize
}

/// Resolve one descriptor per raw series, preserving input order.
///
/// Color precedence is custom override, then the metric's catalog color,
/// then the palette indexed by encounter position. The result depends only
/// on the arguments, so re-running it never reshuffles colors or axes.
/// Axis ids are chosen over all series, hidden ones included, so toggling
/// visibility never moves a series between shared and per-metric axes.
pub fn resolve(series: &[RawSeries], config: &ChartConfiguration, locale: Locale) -> Vec<SeriesDescriptor> {
    let multi_axis = uses_multi_axis(series.iter().map(|s| &s.metric), config.normalize);

    series
        .iter()
        .enumerate()
        .map(|(encounter_index, raw)| {
            let key = raw.key();
            let catalog = describe(&raw.metric);

            let color = config
                .custom_colors
                .get(&key)
                .cloned()
                .or_else(|| catalog.color.map(str::to_string))
                .unwrap_or_else(|| PALETTE[encounter_index % PALETTE.len()].to_string());

            let axis_id = if multi_axis {
                AxisId::Metric(raw.metric.clone())
            } else {
                AxisId::Shared
            };

            SeriesDescriptor {
                name: format!("{} - {}", raw.device_id, raw.metric.label(locale)),
                metric: raw.metric.clone(),
                color,
                axis_id,
                unit: catalog.unit.to_string(),
                hidden: config.is_hidden(&key),
                opacity: config.opacity_for(&key),
                key,
            }
        })
        .collect()
}

/// Fold the metrics observed in this pass into the first-seen order: new
/// metrics are appended, vanished ones dropped, survivors keep their
/// relative order. Applying it twice with the same input is a no-op.
pub fn update_metric_priority(current: &[MetricCode], observed: &[MetricCode]) -> Vec<MetricCode> {
    let observed_set: HashSet<&MetricCode> = observed.iter().collect();

    let mut order: Vec<MetricCode> = current
        .iter()
        .filter(|m| observed_set.contains(m))
        .cloned()
        .collect();

    for metric in observed {
        if !order.contains(metric) {
            order.push(metric.clone());
        }
    }

    order
}

/// Distinct metrics in encounter order.
pub fn distinct_metrics<'a>(metrics: impl IntoIterator<Item = &'a MetricCode>) -> Vec<MetricCode> {
    let mut seen = Vec::new();
    for metric in metrics {
        if !seen.contains(metric) {
            seen.push(metric.clone());
        }
    }
    seen
}
