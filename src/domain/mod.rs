// Domain layer - Metric catalog, raw series and chart model types
pub mod chart;
pub mod dashboard;
pub mod device;
pub mod metric;
pub mod telemetry;
