use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::data::{coerce_to_numeric, exact_integers, CoerceError, Dataset, CURRENCY_MARKER};
use crate::processing::statistics::{group_exact_stats, group_stats, StatsTable};
use crate::processing::validate::TIME_INDEX_COLUMN;
use crate::render::{render_stats_chart, ChartTheme, RenderError};
use crate::state::{PlotId, PlotStore, StoreError};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("column {column:?} is not numeric: {source}")]
    NonNumeric {
        column: String,
        #[source]
        source: CoerceError,
    },
    #[error("column {0:?} is not in the dataset")]
    MissingColumn(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Aggregates for one column plus the chart rendered from them.
///
/// Serializes as `{"plot_uri": ..., "<column>": {<group>: {"sum", "mean"}}}`.
#[derive(Debug, Clone)]
pub struct ColumnStatsReport {
    pub plot_id: PlotId,
    pub plot_uri: String,
    pub column: String,
    pub table: StatsTable,
}

impl Serialize for ColumnStatsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("plot_uri", &self.plot_uri)?;
        map.serialize_entry(&self.column, &self.table)?;
        map.end()
    }
}

pub fn chart_title(column: &str) -> String {
    format!("{column} Sum and Mean")
}

/// `<root_url>plots/<id>`, tolerating a root without trailing slash.
pub fn plot_uri(root_url: &str, id: &PlotId) -> String {
    let root = root_url.trim_end_matches('/');
    format!("{root}/plots/{id}")
}

/// Sum and mean of `column` per time-index group, with a bar chart of both
/// persisted to `store`.
///
/// Nothing is stored unless the column coerces to numbers.
pub fn get_column_stats(
    dataset: &Dataset,
    column: &str,
    root_url: &str,
    store: &dyn PlotStore,
    theme: ChartTheme,
) -> Result<ColumnStatsReport, StatsError> {
    let target = dataset
        .column(column)
        .ok_or_else(|| StatsError::MissingColumn(column.to_string()))?;
    let keys = dataset
        .column(TIME_INDEX_COLUMN)
        .ok_or_else(|| StatsError::MissingColumn(TIME_INDEX_COLUMN.to_string()))?;

    let values = coerce_to_numeric(&target.cells, CURRENCY_MARKER).map_err(|source| {
        StatsError::NonNumeric {
            column: column.to_string(),
            source,
        }
    })?;
    let table = match exact_integers(&target.cells) {
        Some(whole) => group_exact_stats(keys, &whole),
        None => group_stats(keys, &values),
    };

    let jpeg = render_stats_chart(&chart_title(column), &table, theme)?;
    let plot_id = store.put(jpeg)?;

    Ok(ColumnStatsReport {
        plot_uri: plot_uri(root_url, &plot_id),
        plot_id,
        column: column.to_string(),
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_csv;
    use crate::state::MemoryPlotStore;
    use serde_json::{json, Value};

    const ROOT: &str = "http://stats.local/";

    #[test]
    fn reports_stats_and_stores_the_chart() {
        let ds = parse_csv(b"PID,Zeitindex,Amount\n1,t1,10\n1,t1,20\n2,t2,5\n", ",").unwrap();
        let store = MemoryPlotStore::default();
        let report = get_column_stats(&ds, "Amount", ROOT, &store, ChartTheme::Light).unwrap();

        assert_eq!(
            report.plot_uri,
            format!("http://stats.local/plots/{}", report.plot_id)
        );
        let stored = store.get(&report.plot_id.to_string()).unwrap().unwrap();
        assert!(stored.starts_with(&[0xFF, 0xD8]));

        let json: Value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["Amount"],
            json!({"t1": {"sum": 30, "mean": 15.0}, "t2": {"sum": 5, "mean": 5.0}})
        );
        let text = serde_json::to_string(&report).unwrap();
        assert!(text.starts_with(r#"{"plot_uri":"#));
    }

    #[test]
    fn coerces_currency_text() {
        let ds = parse_csv(
            b"PID;Zeitindex;Preis\n1;2024;\x8012.50\n2;2024;\x807.50\n",
            ";",
        )
        .unwrap();
        let store = MemoryPlotStore::default();
        let report = get_column_stats(&ds, "Preis", ROOT, &store, ChartTheme::Light).unwrap();
        let group = report.table.get("2024").unwrap();
        assert_eq!((group.sum, group.mean), (20.0, Some(10.0)));
    }

    #[test]
    fn boolean_columns_count_as_zero_and_one() {
        let ds = parse_csv(b"PID,Zeitindex,Flag\n1,a,True\n2,a,False\n3,a,True\n", ",").unwrap();
        let store = MemoryPlotStore::default();
        let report = get_column_stats(&ds, "Flag", ROOT, &store, ChartTheme::Light).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["Flag"]["a"]["sum"], json!(2));
    }

    #[test]
    fn non_numeric_column_fails_without_storing() {
        let ds = parse_csv(b"PID,Zeitindex,Name\n1,t1,abc\n", ",").unwrap();
        let store = MemoryPlotStore::default();
        let err = get_column_stats(&ds, "Name", ROOT, &store, ChartTheme::Light).unwrap_err();
        assert!(matches!(err, StatsError::NonNumeric { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn builds_uris_with_or_without_trailing_slash() {
        let id = PlotId::new_random();
        assert_eq!(plot_uri("http://h:8080/", &id), format!("http://h:8080/plots/{id}"));
        assert_eq!(plot_uri("http://h:8080", &id), format!("http://h:8080/plots/{id}"));
    }
}
