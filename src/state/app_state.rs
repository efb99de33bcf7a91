use std::sync::Arc;

use crate::config::{ServerConfig, StoreBackend};
use crate::render::ChartTheme;
use crate::state::plot_store::{LocalPlotStore, MemoryPlotStore, PlotStore};

/// Shared handler state. Cloned per request; the store is the only thing
/// requests have in common.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlotStore>,
    pub theme: ChartTheme,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn PlotStore>) -> Self {
        Self {
            store,
            theme: ChartTheme::default(),
            max_body_bytes: crate::config::DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let store: Arc<dyn PlotStore> = match config.store_backend {
            StoreBackend::Disk => Arc::new(LocalPlotStore::new(config.plot_dir.clone())),
            StoreBackend::Memory => Arc::new(MemoryPlotStore::default()),
        };
        Self {
            store,
            theme: config.chart_theme,
            max_body_bytes: config.max_body_bytes,
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: ChartTheme) -> Self {
        self.theme = theme;
        self
    }
}
