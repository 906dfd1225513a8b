// Telemetry data domain models - Raw per-device, per-metric series
use super::metric::MetricCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Good,
    Interpolated,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Raw,
    Minute,
    Hour,
    Day,
}

impl Aggregation {
    /// Aggregation tag for a sampling interval given in minutes.
    pub fn for_interval(interval_minutes: u32) -> Self {
        if interval_minutes < 60 {
            Aggregation::Raw
        } else if interval_minutes < 1440 {
            Aggregation::Hour
        } else {
            Aggregation::Day
        }
    }
}

/// One sample. The timestamp is optional because upstream sources can hand
/// us points without one; the merger skips those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            value,
            unit: None,
            quality: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// A point is usable when it has a timestamp and a finite value.
    pub fn is_well_formed(&self) -> bool {
        self.timestamp.is_some() && self.value.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSeries {
    pub device_id: String,
    pub metric: MetricCode,
    pub data: Vec<DataPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

impl RawSeries {
    pub fn new(device_id: impl Into<String>, metric: MetricCode, data: Vec<DataPoint>) -> Self {
        Self {
            device_id: device_id.into(),
            metric,
            data,
            aggregation: None,
        }
    }

    /// Stable series key: device id and metric code joined by `_`.
    pub fn key(&self) -> String {
        series_key(&self.device_id, &self.metric)
    }

    pub fn last_point(&self) -> Option<&DataPoint> {
        self.data.last()
    }
}

pub fn series_key(device_id: &str, metric: &MetricCode) -> String {
    format!("{}_{}", device_id, metric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_series_key() {
        let series = RawSeries::new("office-environmental-001", MetricCode::Co2, vec![]);
        assert_eq!(series.key(), "office-environmental-001_co2");
    }

    #[test]
    fn test_point_well_formedness() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(DataPoint::new(ts, 1.0).is_well_formed());
        assert!(!DataPoint::new(ts, f64::NAN).is_well_formed());
        assert!(!DataPoint::new(ts, f64::INFINITY).is_well_formed());

        let missing = DataPoint {
            timestamp: None,
            value: 1.0,
            unit: None,
            quality: None,
        };
        assert!(!missing.is_well_formed());
    }

    #[test]
    fn test_aggregation_for_interval() {
        assert_eq!(Aggregation::for_interval(5), Aggregation::Raw);
        assert_eq!(Aggregation::for_interval(60), Aggregation::Hour);
        assert_eq!(Aggregation::for_interval(1440), Aggregation::Day);
    }
}
