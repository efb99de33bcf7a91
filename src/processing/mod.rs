pub mod column_stats;
pub mod statistics;
pub mod validate;

pub use column_stats::{get_column_stats, ColumnStatsReport, StatsError};
pub use statistics::{group_exact_stats, group_stats, GroupStats, StatsTable};
pub use validate::{all_required_columns_exist, ROW_ID_COLUMN, TIME_INDEX_COLUMN};
