// Time-bucket merger - Aligns independent series into timestamp-keyed rows
use crate::domain::chart::{MergedCell, MergedRow, SeriesDescriptor};
use crate::domain::metric::describe;
use crate::domain::telemetry::RawSeries;
use std::collections::{BTreeMap, HashMap};

/// Rescale a value onto 0-100 using the metric's nominal range. Values
/// outside the range map outside 0-100; nothing is clamped.
pub fn normalize_value(value: f64, range: (f64, f64)) -> f64 {
    let (lo, hi) = range;
    let span = hi - lo;
    if span == 0.0 {
        return 0.0;
    }
    (value - lo) / span * 100.0
}

pub fn denormalize(normalized: f64, range: (f64, f64)) -> f64 {
    let (lo, hi) = range;
    lo + normalized / 100.0 * (hi - lo)
}

/// Merge raw series into rows ordered by timestamp.
///
/// Only series with a descriptor contribute columns. Points with a missing
/// timestamp or a non-finite value are skipped individually. Timestamps are
/// aligned by exact (millisecond) equality.
pub fn merge(series: &[RawSeries], descriptors: &[SeriesDescriptor], normalize: bool) -> Vec<MergedRow> {
    if series.is_empty() {
        return Vec::new();
    }

    let units: HashMap<&str, &str> = descriptors
        .iter()
        .map(|d| (d.key.as_str(), d.unit.as_str()))
        .collect();

    let mut by_timestamp: BTreeMap<i64, MergedRow> = BTreeMap::new();

    for raw in series {
        let key = raw.key();
        let Some(unit) = units.get(key.as_str()) else {
            continue;
        };
        let range = describe(&raw.metric).range;
        let mut skipped = 0usize;

        for point in &raw.data {
            let timestamp = match point.timestamp {
                Some(ts) if point.value.is_finite() => ts,
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let (value, original) = if normalize {
                (normalize_value(point.value, range), Some(point.value))
            } else {
                (point.value, None)
            };

            let row = by_timestamp
                .entry(timestamp.timestamp_millis())
                .or_insert_with(|| MergedRow::new(timestamp));
            row.cells.insert(
                key.clone(),
                MergedCell {
                    value,
                    original,
                    unit: unit.to_string(),
                    metric: raw.metric.clone(),
                },
            );
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} malformed points in series {}", skipped, key);
        }
    }

    by_timestamp
        .into_values()
        .enumerate()
        .map(|(index, mut row)| {
            row.index = index;
            row
        })
        .collect()
}
