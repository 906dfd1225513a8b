// Mock sensor source - Synthetic devices and time series for local use
use crate::application::data_source::SensorDataSource;
use crate::domain::dashboard::DateRange;
use crate::domain::device::{Device, DeviceStatus, DeviceType, FacilityType, Location};
use crate::domain::metric::{describe, MetricCode};
use crate::domain::telemetry::{Aggregation, DataPoint, Quality, RawSeries};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

const ANOMALY_RATE: f64 = 0.02;

struct Facility {
    name: &'static str,
    floors: u32,
    areas: &'static [&'static str],
    zones: &'static [&'static str],
}

fn facility(kind: FacilityType) -> Facility {
    match kind {
        FacilityType::Office => Facility {
            name: "Tokyo HQ Office",
            floors: 15,
            areas: &["North Wing", "South Wing", "Central"],
            zones: &["A", "B", "C", "D"],
        },
        FacilityType::Factory => Facility {
            name: "Osaka Manufacturing Plant",
            floors: 3,
            areas: &["Production Line 1", "Production Line 2", "Warehouse", "Quality Control"],
            zones: &["Zone 1", "Zone 2", "Zone 3"],
        },
        FacilityType::Retail => Facility {
            name: "Shibuya Shopping Center",
            floors: 8,
            areas: &["Fashion", "Electronics", "Food Court", "Entertainment"],
            zones: &["East", "West", "Center"],
        },
        FacilityType::Datacenter => Facility {
            name: "Cloud Data Center DC-1",
            floors: 2,
            areas: &["Server Room A", "Server Room B", "Network Core", "Cooling Plant"],
            zones: &["Rack 1-10", "Rack 11-20", "Rack 21-30"],
        },
    }
}

fn devices_per_area(device_type: DeviceType) -> usize {
    match device_type {
        DeviceType::Environmental => 3,
        DeviceType::Power | DeviceType::Hvac | DeviceType::Lighting => 2,
        DeviceType::Occupancy | DeviceType::Security => 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pattern {
    Sine,
    SlowSine,
    Random,
    BusinessHours,
    Occupancy,
    Daylight,
    Binary,
    Step,
}

/// Baseline, swing and shape of the synthetic signal for one metric.
fn pattern_for(metric: &MetricCode) -> (f64, f64, Pattern) {
    match metric {
        MetricCode::Temperature => (22.0, 5.0, Pattern::Sine),
        MetricCode::Humidity => (45.0, 15.0, Pattern::Random),
        MetricCode::Co2 => (500.0, 300.0, Pattern::Occupancy),
        MetricCode::Power => (50.0, 30.0, Pattern::BusinessHours),
        MetricCode::Occupancy => (20.0, 50.0, Pattern::BusinessHours),
        MetricCode::Illuminance => (500.0, 300.0, Pattern::Daylight),
        MetricCode::Noise => (45.0, 20.0, Pattern::Random),
        MetricCode::Pressure => (1013.0, 10.0, Pattern::SlowSine),
        MetricCode::HvacStatus => (1.0, 0.0, Pattern::Binary),
        MetricCode::SetTemperature => (22.0, 2.0, Pattern::Step),
        MetricCode::Unknown(_) => (50.0, 20.0, Pattern::Random),
    }
}

fn is_business_hours(at: DateTime<Utc>) -> bool {
    let weekday = at.weekday().number_from_monday();
    (8..=18).contains(&at.hour()) && weekday <= 5
}

fn generate_devices(kind: FacilityType, rng: &mut SmallRng) -> Vec<Device> {
    let site = facility(kind);
    let mut devices = Vec::new();

    for floor in 1..=site.floors {
        for area in site.areas {
            for device_type in DeviceType::ALL {
                for i in 1..=devices_per_area(device_type) {
                    let status = if rng.random::<f64>() > 0.05 {
                        DeviceStatus::Online
                    } else if rng.random::<f64>() > 0.5 {
                        DeviceStatus::Offline
                    } else {
                        DeviceStatus::Error
                    };
                    let zone = site.zones[rng.random_range(0..site.zones.len())];

                    devices.push(Device {
                        id: Device::format_id(kind, device_type, devices.len() + 1),
                        name: Device::format_name(device_type, floor, area, i),
                        device_type,
                        location: Location {
                            facility: site.name.to_string(),
                            floor,
                            area: area.to_string(),
                            zone: Some(zone.to_string()),
                        },
                        metrics: device_type.metrics(),
                        status,
                    });
                }
            }
        }
    }

    devices
}

/// Seeded synthetic data source. The device inventory is fixed at
/// construction; series and realtime samples draw from one shared RNG, so
/// two sources built with the same seed answer the same call sequence
/// identically.
pub struct MockDataSource {
    devices: Vec<Device>,
    rng: Mutex<SmallRng>,
}

impl MockDataSource {
    pub fn new(facility: FacilityType, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let devices = generate_devices(facility, &mut rng);
        Self {
            devices,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(FacilityType::Office, seed)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut SmallRng) -> T) -> anyhow::Result<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow::anyhow!("Mock data source RNG lock poisoned"))?;
        Ok(f(&mut *rng))
    }

    fn generate_points(
        rng: &mut SmallRng,
        metric: &MetricCode,
        range: DateRange,
        interval_minutes: u32,
    ) -> Vec<DataPoint> {
        let (base, swing, pattern) = pattern_for(metric);
        let unit = describe(metric).unit;
        let step = Duration::minutes(i64::from(interval_minutes.max(1)));

        let mut points = Vec::new();
        let mut current = range.start;
        let mut index = 0u64;

        while current <= range.end {
            let business = is_business_hours(current);
            let i = index as f64;

            let mut value = match pattern {
                Pattern::Sine => base + (i * 0.1).sin() * swing,
                Pattern::SlowSine => base + (i * 0.02).sin() * swing,
                Pattern::Random => base + (rng.random::<f64>() - 0.5) * swing,
                Pattern::BusinessHours if business => {
                    base + swing * 0.8 + rng.random::<f64>() * swing * 0.2
                }
                Pattern::BusinessHours => base + rng.random::<f64>() * swing * 0.2,
                Pattern::Occupancy if business => {
                    base + swing * 0.6 + rng.random::<f64>() * swing * 0.4
                }
                Pattern::Occupancy => base + rng.random::<f64>() * swing * 0.1,
                Pattern::Daylight => {
                    let day_progress = f64::from(current.hour()) / 24.0;
                    base + (day_progress * std::f64::consts::PI).sin() * swing
                }
                Pattern::Binary => {
                    if business {
                        1.0
                    } else {
                        0.0
                    }
                }
                Pattern::Step => base + ((index / 20) % 3) as f64 - 1.0,
            };

            if rng.random::<f64>() < ANOMALY_RATE {
                value *= if rng.random::<f64>() > 0.5 { 1.5 } else { 0.5 };
            }

            let quality = if rng.random::<f64>() < 0.98 {
                Quality::Good
            } else if rng.random::<f64>() < 0.5 {
                Quality::Interpolated
            } else {
                Quality::Error
            };

            points.push(
                DataPoint::new(current, value.max(0.0))
                    .with_unit(unit)
                    .with_quality(quality),
            );

            current += step;
            index += 1;
        }

        points
    }
}

#[async_trait]
impl SensorDataSource for MockDataSource {
    async fn list_devices(&self) -> anyhow::Result<Vec<Device>> {
        Ok(self.devices.clone())
    }

    async fn fetch_series(
        &self,
        device_ids: &[String],
        metrics: &[MetricCode],
        range: DateRange,
        interval_minutes: u32,
    ) -> anyhow::Result<Vec<RawSeries>> {
        if !range.is_valid() {
            anyhow::bail!("Date range starts after it ends: {} > {}", range.start, range.end);
        }

        let aggregation = Aggregation::for_interval(interval_minutes);

        self.with_rng(|rng| {
            let mut series = Vec::new();
            for device_id in device_ids {
                let Some(device) = self.devices.iter().find(|d| &d.id == device_id) else {
                    tracing::warn!("Unknown device requested: {}", device_id);
                    continue;
                };
                if !device.is_online() {
                    tracing::debug!("Skipping device {} with status {:?}", device.id, device.status);
                    continue;
                }

                for metric in device.metrics.iter().filter(|m| metrics.contains(m)) {
                    let data = Self::generate_points(rng, metric, range, interval_minutes);
                    let mut raw = RawSeries::new(device.id.clone(), metric.clone(), data);
                    raw.aggregation = Some(aggregation);
                    series.push(raw);
                }
            }
            series
        })
    }

    async fn realtime_point(&self, last: Option<&DataPoint>, metric: &MetricCode) -> anyhow::Result<DataPoint> {
        let base = last.map(|p| p.value).unwrap_or(20.0);
        let unit = describe(metric).unit;

        self.with_rng(|rng| {
            let value = base + (rng.random::<f64>() - 0.5) * 2.0;
            let quality = if rng.random::<f64>() > 0.02 {
                Quality::Good
            } else {
                Quality::Error
            };
            DataPoint::new(Utc::now(), value.max(0.0))
                .with_unit(unit)
                .with_quality(quality)
        })
    }
}
