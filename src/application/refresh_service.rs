// Realtime refresh service - Appends live samples and recomputes on a fixed interval
use crate::application::chart_service::{ChartModel, ChartService};
use crate::application::data_source::SensorDataSource;
use chrono::{DateTime, TimeDelta, Utc};
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

pub const MIN_REFRESH_SECS: u64 = 1;
pub const MAX_REFRESH_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct RefreshTick {
    pub tick: u64,
    pub at: DateTime<Utc>,
    pub appended: usize,
    pub model: ChartModel,
}

#[derive(Clone)]
pub struct RefreshService {
    source: Arc<dyn SensorDataSource>,
    period: Duration,
    window: Option<TimeDelta>,
}

impl RefreshService {
    pub fn new(source: Arc<dyn SensorDataSource>, interval_secs: u64) -> anyhow::Result<Self> {
        if !(MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&interval_secs) {
            anyhow::bail!(
                "Refresh interval {}s is outside {}..={}s",
                interval_secs,
                MIN_REFRESH_SECS,
                MAX_REFRESH_SECS
            );
        }
        Ok(Self {
            source,
            period: Duration::from_secs(interval_secs),
            window: None,
        })
    }

    /// Keep only samples within `window` of each series' newest sample.
    pub fn with_window(mut self, window: TimeDelta) -> Self {
        self.window = Some(window);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Emit one recomputed model per interval until `stop` flips to true or
    /// the stream is dropped. Each tick's work is synchronous apart from
    /// asking the source for the next samples, so stopping never leaves
    /// work half done.
    pub fn run(
        &self,
        mut chart: ChartService,
        mut stop: watch::Receiver<bool>,
    ) -> impl Stream<Item = RefreshTick> + Send + 'static {
        let source = self.source.clone();
        let period = self.period;
        let window = self.window;

        async_stream::stream! {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = IntervalStream::new(timer);
            let mut tick = 0u64;

            loop {
                if *stop.borrow() {
                    break;
                }
                tokio::select! {
                    _ = ticks.next() => {}
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                tick += 1;
                let mut appended = 0usize;
                for series in chart.series_mut().iter_mut() {
                    match source.realtime_point(series.last_point(), &series.metric).await {
                        Ok(point) => {
                            let newest = point.timestamp;
                            series.data.push(point);
                            appended += 1;
                            if let Some(cutoff) = window.zip(newest).and_then(|(w, t)| t.checked_sub_signed(w)) {
                                series.data.retain(|p| p.timestamp.is_some_and(|t| t >= cutoff));
                            }
                        }
                        Err(e) => {
                            tracing::warn!("Realtime sample for {} failed: {}", series.key(), e);
                        }
                    }
                }

                let model = chart.recompute();
                tracing::debug!("Refresh tick {}: appended {} samples", tick, appended);
                yield RefreshTick { tick, at: Utc::now(), appended, model };
            }

            tracing::debug!("Realtime refresh stopped after {} ticks", tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartSession;
    use crate::domain::metric::{Locale, MetricCode};
    use crate::domain::telemetry::{DataPoint, RawSeries};
    use crate::infrastructure::mock_source::MockDataSource;
    use chrono::{Datelike, TimeZone};
    use futures::pin_mut;

    fn chart() -> ChartService {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut svc = ChartService::new("Live", ChartSession::default(), Locale::En);
        svc.set_data(vec![
            RawSeries::new("env", MetricCode::Temperature, vec![DataPoint::new(start, 21.0)]),
            RawSeries::new("meter", MetricCode::Power, vec![DataPoint::new(start, 40.0)]),
        ]);
        svc
    }

    #[test]
    fn test_interval_bounds() {
        let source: Arc<dyn SensorDataSource> = Arc::new(MockDataSource::with_seed(1));
        assert!(RefreshService::new(source.clone(), 0).is_err());
        assert!(RefreshService::new(source.clone(), 61).is_err());
        assert_eq!(RefreshService::new(source, 5).unwrap().period(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_append_and_recompute() {
        let source: Arc<dyn SensorDataSource> = Arc::new(MockDataSource::with_seed(7));
        let service = RefreshService::new(source, 5).unwrap();
        let (_stop_tx, stop_rx) = watch::channel(false);

        let stream = service.run(chart(), stop_rx);
        pin_mut!(stream);

        let first = stream.next().await.unwrap();
        assert_eq!(first.tick, 1);
        assert_eq!(first.appended, 2);
        assert_eq!(first.model.descriptors.len(), 2);

        let second = stream.next().await.unwrap();
        assert_eq!(second.tick, 2);
        let points: usize = second.model.rows.iter().map(|r| r.cells.len()).sum();
        assert_eq!(points, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_drops_old_samples() {
        let source: Arc<dyn SensorDataSource> = Arc::new(MockDataSource::with_seed(3));
        let service = RefreshService::new(source, 1).unwrap().with_window(TimeDelta::hours(1));
        let (_stop_tx, stop_rx) = watch::channel(false);

        // seeded points date from 2024, so the first live sample pushes them out
        let stream = service.run(chart(), stop_rx);
        pin_mut!(stream);

        for _ in 0..3 {
            let tick = stream.next().await.unwrap();
            let points: usize = tick.model.rows.iter().map(|r| r.cells.len()).sum();
            assert_eq!(points, 2 * tick.tick as usize);
            assert!(tick.model.rows.iter().all(|r| r.timestamp.year() > 2024));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_signal_ends_stream() {
        let source: Arc<dyn SensorDataSource> = Arc::new(MockDataSource::with_seed(7));
        let service = RefreshService::new(source, 1).unwrap();
        let (stop_tx, stop_rx) = watch::channel(false);

        let stream = service.run(chart(), stop_rx);
        pin_mut!(stream);

        assert!(stream.next().await.is_some());
        stop_tx.send(true).unwrap();
        assert!(stream.next().await.is_none());
    }
}
