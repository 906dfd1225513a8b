use chrono::{TimeZone, Utc};
use energy_dashboard::application::dashboard_service::DashboardService;
use energy_dashboard::domain::dashboard::DateRange;
use energy_dashboard::domain::metric::{Locale, MetricCode};
use energy_dashboard::infrastructure::csv_export::to_csv;
use energy_dashboard::infrastructure::model_mapper::to_view;
use energy_dashboard::infrastructure::mock_source::MockDataSource;
use energy_dashboard::infrastructure::svg_render::render_svg;
use std::sync::Arc;

#[tokio::test]
async fn mock_data_flows_through_every_export() {
    let service = DashboardService::new(Arc::new(MockDataSource::with_seed(8)), Locale::Ja, 60, 800);
    let now = Utc.with_ymd_and_hms(2024, 6, 5, 12, 0, 0).unwrap();

    let mut dashboard = service.default_dashboard(now).await.unwrap();
    dashboard.graphs[0].selected_metrics = vec![MetricCode::Temperature, MetricCode::Power];
    dashboard.date_range = DateRange::last_days(now, 1).unwrap();

    let rendered = service.render_dashboard(&dashboard).await;
    assert_eq!(rendered.len(), 1);
    let model = &rendered[0].model;
    if model.is_empty() {
        // every selected default device happened to be offline
        return;
    }

    let csv = to_csv(model).unwrap();
    assert!(csv.starts_with("Timestamp,"));
    assert_eq!(csv.lines().count(), model.rows.len() + 1);

    let svg = render_svg(model, 800).unwrap();
    assert!(svg.contains("<svg"));

    let view = to_view(model);
    assert_eq!(view.rows.len(), model.rows.len());
    assert_eq!(view.axes.slots.len(), 4);
}
