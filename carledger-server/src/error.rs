//! HTTP error mapping

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use carledger_core::LedgerError;
use serde_json::json;

/// Error returned by handlers
///
/// Rendered as `{success: false, error, code}` with the status taken from
/// the ledger error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Request body could not be decoded
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Endpoint not found")]
    NoRoute,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Ledger(e) => (
                StatusCode::from_u16(e.http_status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.error_code(),
            ),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NoRoute => (StatusCode::NOT_FOUND, "NO_ROUTE"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        } else {
            tracing::warn!(code, error = %message, "request rejected");
        }

        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}
