use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, warn, Span};

use crate::data::parse_csv;
use crate::http::error::ApiError;
use crate::processing::{all_required_columns_exist, get_column_stats, ColumnStatsReport, StatsError};
use crate::render::ChartTheme;
use crate::state::{AppState, PlotStore};

pub(crate) async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Query value that is present and not blank.
fn required_param(params: &HashMap<String, String>, name: &str) -> Option<String> {
    params
        .get(name)
        .filter(|v| !v.is_empty())
        .cloned()
}

/// Scheme, host and port the client used, ending in `/`.
pub(crate) fn request_root_url(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(ToString::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string());
    let scheme = uri.scheme_str().unwrap_or("http");
    format!("{scheme}://{host}/")
}

pub(crate) async fn stats_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<Json<ColumnStatsReport>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::MissingCsv);
    }

    let (Some(column), Some(sep)) = (
        required_param(&params, "column"),
        required_param(&params, "sep"),
    ) else {
        return Err(ApiError::MissingParams);
    };

    info!(
        "Received stats request: column {column}, separator {sep:?}, CSV file size {} bytes",
        body.len()
    );

    let root_url = request_root_url(&headers, &uri);
    let store = Arc::clone(&state.store);
    let theme = state.theme;
    let span = Span::current();

    let report = tokio::task::spawn_blocking(move || {
        span.in_scope(|| compute_stats(&body, &column, &sep, &root_url, store.as_ref(), theme))
    })
    .await
    .map_err(|e| {
        error!("Stats task did not complete: {e}");
        ApiError::Internal
    })??;

    Ok(Json(report))
}

/// Parse, validate and aggregate. Runs on the blocking pool.
fn compute_stats(
    body: &[u8],
    column: &str,
    sep: &str,
    root_url: &str,
    store: &dyn PlotStore,
    theme: ChartTheme,
) -> Result<ColumnStatsReport, ApiError> {
    let dataset = parse_csv(body, sep).map_err(|e| {
        warn!("Error while attempting to parse the CSV file. {e}");
        ApiError::CsvParse
    })?;
    info!(
        "Parsed CSV file: {} rows, {} columns",
        dataset.row_count(),
        dataset.columns().len()
    );

    if !all_required_columns_exist(&dataset, column) {
        return Err(ApiError::MissingColumns {
            column: column.to_string(),
            sep: sep.to_string(),
        });
    }

    let report = get_column_stats(&dataset, column, root_url, store, theme).map_err(|e| match e {
        StatsError::NonNumeric { .. } => {
            info!("Rejected column: {e}");
            ApiError::NonNumericColumn
        }
        other => {
            error!("Failed to generate column statistics. {other}");
            ApiError::Internal
        }
    })?;

    info!(
        "Generated column statistics for {} groups, plot {} stored in {}",
        report.table.len(),
        report.plot_id,
        store.backend_tag()
    );
    Ok(report)
}

pub(crate) async fn plot_handler(
    State(state): State<AppState>,
    Path(plot_id): Path<String>,
) -> Result<Response, ApiError> {
    let store = Arc::clone(&state.store);
    let lookup_id = plot_id.clone();

    let found = tokio::task::spawn_blocking(move || store.get(&lookup_id))
        .await
        .map_err(|e| {
            error!("Plot lookup task did not complete: {e}");
            ApiError::Internal
        })?
        .map_err(|e| {
            error!("Error fetching the plot with ID {plot_id}. {e}");
            ApiError::Internal
        })?;

    match found {
        Some(bytes) => Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response()),
        None => Err(ApiError::ImageNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn root_url_prefers_the_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.org:8080"));
        let uri: Uri = "/stats/?column=a&sep=,".parse().unwrap();
        assert_eq!(request_root_url(&headers, &uri), "http://example.org:8080/");
    }

    #[test]
    fn root_url_falls_back_to_the_uri_authority() {
        let uri: Uri = "https://api.example.org/stats/".parse().unwrap();
        assert_eq!(
            request_root_url(&HeaderMap::new(), &uri),
            "https://api.example.org/"
        );
        let bare: Uri = "/stats/".parse().unwrap();
        assert_eq!(request_root_url(&HeaderMap::new(), &bare), "http://localhost/");
    }

    #[test]
    fn blank_params_count_as_missing() {
        let params: HashMap<String, String> = [("column".to_string(), String::new())].into();
        assert_eq!(required_param(&params, "column"), None);
        assert_eq!(required_param(&params, "sep"), None);
    }
}
