use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Every way a request can end other than success. The `Display` text is the
/// `error` field of the JSON body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("No CSV file was provided")]
    MissingCsv,
    #[error("Request is missing the column or sep parameter")]
    MissingParams,
    /// The upload could not be read as CSV with the given separator.
    #[error("An internal error has occurred")]
    CsvParse,
    #[error(
        "One of the required columns (PID, Zeitindex, {column}) is missing or the choosen separator '{sep}' is not correct."
    )]
    MissingColumns { column: String, sep: String },
    #[error("The selected column needs to be of numerical or boolean type")]
    NonNumericColumn,
    #[error("Image not found")]
    ImageNotFound,
    #[error("An internal error has occurred")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCsv
            | ApiError::MissingParams
            | ApiError::MissingColumns { .. }
            | ApiError::NonNumericColumn => StatusCode::BAD_REQUEST,
            ApiError::ImageNotFound => StatusCode::NOT_FOUND,
            ApiError::CsvParse | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
