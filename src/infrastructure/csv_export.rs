// CSV export - One record per merged row, one column per visible series
use crate::application::chart_service::ChartModel;
use crate::infrastructure::export::ExportError;
use chrono::SecondsFormat;

pub fn header(model: &ChartModel) -> Vec<String> {
    std::iter::once("Timestamp".to_string())
        .chain(
            model
                .visible_series()
                .map(|d| format!("{} ({})", d.name, d.unit)),
        )
        .collect()
}

/// Encode the model's plotted values. A series with no point at a row
/// leaves its cell empty.
pub fn to_csv(model: &ChartModel) -> Result<String, ExportError> {
    if model.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header(model))?;

    for row in &model.rows {
        let mut record = vec![row.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)];
        record.extend(
            model
                .visible_series()
                .map(|d| row.value(&d.key).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_service::ChartService;
    use crate::domain::chart::ChartSession;
    use crate::domain::metric::{Locale, MetricCode};
    use crate::domain::telemetry::{DataPoint, RawSeries};
    use chrono::{Duration, TimeZone, Utc};

    fn model(hide: Option<&str>) -> ChartModel {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut svc = ChartService::new("Export", ChartSession::default(), Locale::En);
        svc.set_data(vec![
            RawSeries::new(
                "env",
                MetricCode::Temperature,
                vec![DataPoint::new(t0, 21.5), DataPoint::new(t0 + Duration::minutes(5), 0.0)],
            ),
            RawSeries::new("meter", MetricCode::Power, vec![DataPoint::new(t0, 12.0)]),
        ]);
        if let Some(key) = hide {
            svc.toggle_visibility(key).unwrap();
        }
        svc.recompute()
    }

    #[test]
    fn test_header_and_empty_cells() {
        let csv = to_csv(&model(None)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Timestamp,env - Temperature (°C),meter - Power (kW)");
        assert_eq!(lines[1], "2024-06-01T12:00:00.000Z,21.5,12");
        // zero stays zero, a missing point stays empty
        assert_eq!(lines[2], "2024-06-01T12:05:00.000Z,0,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_hidden_series_are_not_exported() {
        let csv = to_csv(&model(Some("meter_power"))).unwrap();
        assert_eq!(csv.lines().next(), Some("Timestamp,env - Temperature (°C)"));
    }

    #[test]
    fn test_empty_model_is_rejected() {
        let mut svc = ChartService::new("Empty", ChartSession::default(), Locale::En);
        assert!(matches!(to_csv(&svc.recompute()), Err(ExportError::NoData)));
    }
}
