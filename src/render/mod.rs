pub mod bar_chart;
pub mod fonts;
pub mod theme;

pub use bar_chart::{render_stats_chart, RenderError};
pub use theme::ChartTheme;
