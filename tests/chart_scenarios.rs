use chrono::{DateTime, Duration, TimeZone, Utc};
use energy_dashboard::application::axis_layout::{generate_ticks, reserved_width};
use energy_dashboard::application::chart_service::ChartService;
use energy_dashboard::application::merger::denormalize;
use energy_dashboard::application::preset_repository::PresetRepository;
use energy_dashboard::application::series_resolver::resolve;
use energy_dashboard::domain::chart::{AxisPosition, ChartConfiguration, ChartSession};
use energy_dashboard::domain::dashboard::{ChartPreset, DateRange, GraphConfig};
use energy_dashboard::domain::metric::{describe, Locale, MetricCode};
use energy_dashboard::domain::telemetry::{DataPoint, RawSeries};
use energy_dashboard::infrastructure::preset_store::JsonPresetStore;

fn t(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn series(device: &str, metric: MetricCode, values: &[(i64, f64)]) -> RawSeries {
    RawSeries::new(
        device,
        metric,
        values.iter().map(|(m, v)| DataPoint::new(t(*m), *v)).collect(),
    )
}

fn chart(data: Vec<RawSeries>) -> ChartService {
    let mut chart = ChartService::new("Scenario", ChartSession::default(), Locale::En);
    chart.set_data(data);
    chart
}

#[test]
fn single_series_uses_catalog_domain() {
    let mut chart = chart(vec![series("env", MetricCode::Temperature, &[(0, 20.0), (5, 22.0)])]);
    let model = chart.recompute();

    assert_eq!(model.descriptors.len(), 1);
    assert_eq!(model.rows.len(), 2);
    let slot = model.layout.slot(AxisPosition::InnerLeft);
    assert_eq!(slot.metric, Some(MetricCode::Temperature));
    assert_eq!(slot.domain, Some((15.0, 30.0)));
}

#[test]
fn normalization_keeps_original_values() {
    let mut chart = chart(vec![series("env", MetricCode::Temperature, &[(0, 20.0), (5, 22.0)])]);
    chart.set_normalize(true);
    let model = chart.recompute();

    let range = describe(&MetricCode::Temperature).range;
    for row in &model.rows {
        let cell = &row.cells["env_temperature"];
        let original = cell.original.unwrap();
        assert!((denormalize(cell.value, range) - original).abs() < 1e-9);
    }
    assert!((model.rows[0].cells["env_temperature"].value - 33.333).abs() < 0.01);
    assert_eq!(model.layout.slot(AxisPosition::InnerLeft).domain, Some((0.0, 100.0)));
}

#[test]
fn four_metrics_fill_slots_in_encounter_order() {
    use MetricCode::*;
    let mut chart = chart(vec![
        series("env", Temperature, &[(0, 21.0)]),
        series("env", Humidity, &[(0, 45.0)]),
        series("env", Co2, &[(0, 600.0)]),
        series("meter", Power, &[(0, 30.0)]),
    ]);
    let layout = chart.recompute().layout;

    assert_eq!(layout.slot(AxisPosition::InnerLeft).metric, Some(Temperature));
    assert_eq!(layout.slot(AxisPosition::OuterLeft).metric, Some(Humidity));
    assert_eq!(layout.slot(AxisPosition::InnerRight).metric, Some(Co2));
    assert_eq!(layout.slot(AxisPosition::OuterRight).metric, Some(Power));
    assert!(layout.overflow.is_empty());
}

#[test]
fn fifth_metric_borrows_an_axis_with_its_own_domain() {
    use MetricCode::*;
    let mut chart = chart(vec![
        series("env", Temperature, &[(0, 21.0)]),
        series("env", Humidity, &[(0, 45.0)]),
        series("env", Co2, &[(0, 600.0)]),
        series("meter", Power, &[(0, 30.0)]),
        series("hvac", SetTemperature, &[(0, 22.0)]),
    ]);
    let layout = chart.recompute().layout;

    assert_eq!(layout.overflow.len(), 1);
    let binding = &layout.overflow[0];
    assert_eq!(binding.metric, SetTemperature);
    // shares the °C axis of temperature
    assert_eq!(binding.host, AxisPosition::InnerLeft);
    assert_eq!(layout.domain_for_metric(&SetTemperature), Some((18.0, 28.0)));
}

#[test]
fn slots_survive_hide_and_show() {
    use MetricCode::*;
    let mut chart = chart(vec![
        series("a", Temperature, &[(0, 21.0)]),
        series("b", Humidity, &[(0, 45.0)]),
        series("c", Co2, &[(0, 600.0)]),
    ]);
    let before = chart.recompute().layout;

    chart.toggle_visibility("b_humidity").unwrap();
    let hidden = chart.recompute().layout;
    assert_eq!(hidden.slot(AxisPosition::InnerLeft).metric, Some(Temperature));

    chart.toggle_visibility("b_humidity").unwrap();
    let after = chart.recompute().layout;
    assert_eq!(after.slot(AxisPosition::InnerLeft).metric, before.slot(AxisPosition::InnerLeft).metric);
    assert_eq!(after.slot(AxisPosition::InnerRight).metric, before.slot(AxisPosition::InnerRight).metric);
}

#[test]
fn layout_always_reserves_four_slots() {
    use MetricCode::*;
    let all = [Temperature, Humidity, Co2, Power];
    let mut widths = Vec::new();

    for n in 0..=all.len() {
        let data = all[..n]
            .iter()
            .map(|m| series("dev", m.clone(), &[(0, 1.0)]))
            .collect();
        let layout = chart(data).recompute().layout;
        assert_eq!(layout.slots.len(), 4);
        assert_eq!(layout.populated().count(), n);
        widths.push(reserved_width(&layout));
    }
    assert!(widths.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn tick_contract() {
    for n in 2..=10 {
        let ticks = generate_ticks(400.0, 2000.0, n);
        assert_eq!(ticks.len(), n);
        assert_eq!(ticks[0], 400.0);
        assert_eq!(ticks[n - 1], 2000.0);
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn malformed_point_does_not_empty_the_chart() {
    let mut chart = chart(vec![series(
        "env",
        MetricCode::Humidity,
        &[(0, 40.0), (5, f64::NAN), (10, 42.0)],
    )]);
    let model = chart.recompute();
    assert_eq!(model.rows.len(), 2);
    assert!(!model.is_empty());
}

#[test]
fn resolve_is_stable() {
    let data = vec![
        series("a", MetricCode::Power, &[]),
        series("b", MetricCode::from("radon"), &[]),
    ];
    let mut config = ChartConfiguration::default();
    config.custom_colors.insert("a_power".to_string(), "#101010".to_string());

    assert_eq!(resolve(&data, &config, Locale::En), resolve(&data, &config, Locale::En));
}

#[test]
fn preset_round_trip_restores_dates() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonPresetStore::new(dir.path());

    let d1 = Utc.with_ymd_and_hms(2024, 4, 1, 6, 30, 0).unwrap();
    let d2 = Utc.with_ymd_and_hms(2024, 4, 8, 6, 30, 0).unwrap();
    let preset = ChartPreset::new("Week", DateRange::new(d1, d2), vec![GraphConfig::new("graph-1", "Graph 1")]);
    store.save(&preset).unwrap();

    let reloaded = JsonPresetStore::new(dir.path()).get(&preset.id).unwrap();
    assert_eq!(reloaded.date_range.start, d1);
    assert_eq!(reloaded.date_range.end.timestamp_millis(), d2.timestamp_millis());
}
