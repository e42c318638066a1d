//! Error types for the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use deck_core::FailureKind;
use serde::Serialize;

use crate::store::StoreError;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid campaign brief ID")]
    InvalidId,

    #[error("Campaign brief not found")]
    NotFound,

    #[error("Logo exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Failed to generate presentation")]
    Generation(#[from] deck_core::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            success: bool,
            message: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            errors: Option<Vec<String>>,
        }

        let status = match &self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Generation(e) if e.kind() == FailureKind::Validation => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Generation(_) | ApiError::Store(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            ApiError::Generation(e) if e.kind() == FailureKind::Validation => e.to_string(),
            ApiError::Generation(e) => {
                log::error!("Deck generation failed [{}]: {}", e.kind(), e);
                self.to_string()
            }
            ApiError::Store(e) => {
                log::error!("Brief store failure: {}", e);
                "An error occurred while accessing campaign briefs.".to_string()
            }
            ApiError::Internal(e) => {
                log::error!("Internal error: {}", e);
                "An internal error occurred.".to_string()
            }
            _ => self.to_string(),
        };

        let errors = match self {
            ApiError::Validation(errors) => Some(errors),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
