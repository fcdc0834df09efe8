//! API error responses

use crate::{ScanError, UrlError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error returned by API handlers
///
/// Bad requests render as `{success:false, message}`, everything else as
/// `{success:false, error}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidInput(UrlError::Missing) => {
                ApiError::BadRequest(UrlError::Missing.to_string())
            }
            ScanError::InvalidInput(_) => ApiError::BadRequest("Invalid URL".to_string()),
            ScanError::InvalidRequest(message) => ApiError::BadRequest(message),
            other => {
                tracing::error!("Request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::BadRequest(message) => json!({ "success": false, "message": message }),
            ApiError::Internal(error) => json!({ "success": false, "error": error }),
        };
        (status, Json(body)).into_response()
    }
}
