//! Mapping of failures to HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use webpify_core::{ConvertError, ErrorClass};

/// Error returned by HTTP handlers, rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// The conversion pipeline rejected or failed the batch
    Convert(ConvertError),
    /// The `quality` parameter was not an integer in 1..=100
    InvalidQuality(String),
    /// The multipart body could not be read
    Multipart { status: StatusCode, message: String },
    /// Conversion exceeded the configured request timeout
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Convert(e) => match e.class() {
                ErrorClass::BadRequest => StatusCode::BAD_REQUEST,
                ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InvalidQuality(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart { status, .. } => *status,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::Convert(e) => e.to_string(),
            ApiError::InvalidQuality(raw) => {
                format!("Invalid quality {:?}: must be an integer between 1 and 100", raw)
            }
            ApiError::Multipart { message, .. } => format!("Invalid upload: {}", message),
            ApiError::Timeout => "Conversion timed out".to_string(),
        }
    }
}

impl From<ConvertError> for ApiError {
    fn from(e: ConvertError) -> Self {
        ApiError::Convert(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", detail);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", detail);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
