use crate::data::Dataset;

/// Row identifier column every upload must carry.
pub const ROW_ID_COLUMN: &str = "PID";
/// Column rows are grouped by.
pub const TIME_INDEX_COLUMN: &str = "Zeitindex";

/// True when the row identifier, the time index and `column` are all present.
pub fn all_required_columns_exist(dataset: &Dataset, column: &str) -> bool {
    [ROW_ID_COLUMN, TIME_INDEX_COLUMN, column]
        .iter()
        .all(|name| dataset.has_column(name))
}
