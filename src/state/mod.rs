pub mod app_state;
pub mod plot_store;

pub use app_state::AppState;
pub use plot_store::{LocalPlotStore, MemoryPlotStore, PlotId, PlotStore, StoreError};
