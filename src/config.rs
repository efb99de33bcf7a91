use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::render::ChartTheme;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_PLOT_DIR: &str = "plots";
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Disk,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disk" | "local" => Ok(StoreBackend::Disk),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown plot store backend: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub plot_dir: PathBuf,
    pub store_backend: StoreBackend,
    pub max_body_bytes: usize,
    pub chart_theme: ChartTheme,
    pub font_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            plot_dir: PathBuf::from(DEFAULT_PLOT_DIR),
            store_backend: StoreBackend::Disk,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            chart_theme: ChartTheme::Light,
            font_path: None,
        }
    }
}

impl ServerConfig {
    /// Read `PLOTSTATS_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source; unset or blank values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(v) = get("PLOTSTATS_BIND_ADDR") {
            cfg.bind_addr = parse_var("PLOTSTATS_BIND_ADDR", v)?;
        }
        if let Some(v) = get("PLOTSTATS_PLOT_DIR") {
            cfg.plot_dir = PathBuf::from(v);
        }
        if let Some(v) = get("PLOTSTATS_PLOT_STORE") {
            cfg.store_backend = parse_var("PLOTSTATS_PLOT_STORE", v)?;
        }
        if let Some(v) = get("PLOTSTATS_MAX_BODY_BYTES") {
            cfg.max_body_bytes = parse_var("PLOTSTATS_MAX_BODY_BYTES", v)?;
        }
        if let Some(v) = get("PLOTSTATS_CHART_THEME") {
            cfg.chart_theme = parse_var("PLOTSTATS_CHART_THEME", v)?;
        }
        cfg.font_path = get("PLOTSTATS_FONT_PATH").map(PathBuf::from);

        Ok(cfg)
    }
}

fn parse_var<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}
