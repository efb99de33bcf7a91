//! HTTP service that aggregates a CSV column per time-index group and renders
//! the sums and means as a bar chart.

pub mod config;
pub mod data;
pub mod http;
pub mod processing;
pub mod render;
pub mod state;

pub use config::{ConfigError, ServerConfig, StoreBackend};
pub use http::{build_router, ApiError};
pub use state::{AppState, LocalPlotStore, MemoryPlotStore, PlotId, PlotStore};
