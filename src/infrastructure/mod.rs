// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_export;
pub mod export;
pub mod mock_source;
pub mod model_mapper;
pub mod preset_store;
pub mod svg_render;
