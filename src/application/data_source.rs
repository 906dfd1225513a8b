// Data source trait for per-device, per-metric time series
use crate::domain::dashboard::DateRange;
use crate::domain::device::Device;
use crate::domain::metric::MetricCode;
use crate::domain::telemetry::{DataPoint, RawSeries};
use async_trait::async_trait;

#[async_trait]
pub trait SensorDataSource: Send + Sync {
    /// List every device the source knows about
    async fn list_devices(&self) -> anyhow::Result<Vec<Device>>;

    /// Produce one series per (device, metric) pair for the range
    /// Devices that are not online, and metrics a device does not report, yield nothing
    async fn fetch_series(
        &self,
        device_ids: &[String],
        metrics: &[MetricCode],
        range: DateRange,
        interval_minutes: u32,
    ) -> anyhow::Result<Vec<RawSeries>>;

    /// Next live sample following `last` (for realtime refresh)
    async fn realtime_point(&self, last: Option<&DataPoint>, metric: &MetricCode) -> anyhow::Result<DataPoint>;
}
