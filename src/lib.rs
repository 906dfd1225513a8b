// Multi-series chart and axis layout engine for energy/IoT monitoring dashboards
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
