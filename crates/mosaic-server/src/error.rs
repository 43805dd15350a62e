//! HTTP boundary errors

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mosaic_valuation::ValuationError;
use serde_json::json;
use thiserror::Error;

/// Errors a handler can answer with
///
/// The display string is the client-facing `error` field; internal detail is
/// only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid action")]
    InvalidAction,

    #[error("Invalid message")]
    InvalidMessage,

    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),

    #[error("Internal server error")]
    Valuation(#[from] ValuationError),

    #[error("Internal server error")]
    Internal(String),
}

/// Result type for handlers
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidAction | Self::InvalidMessage | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Valuation(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::InvalidBody(rejection) => {
                tracing::debug!(rejection = %rejection.body_text(), "rejected request body");
            }
            Self::Valuation(e) => tracing::error!(error = %e, "request failed"),
            Self::Internal(detail) => tracing::error!(error = %detail, "request failed"),
            Self::InvalidAction | Self::InvalidMessage => {
                tracing::debug!(error = %self, "rejected request");
            }
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
