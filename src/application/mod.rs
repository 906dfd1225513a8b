// Application layer - Chart engine use cases and the ports they depend on
pub mod axis_layout;
pub mod chart_service;
pub mod dashboard_service;
pub mod data_source;
pub mod merger;
pub mod preset_repository;
pub mod refresh_service;
pub mod series_resolver;
