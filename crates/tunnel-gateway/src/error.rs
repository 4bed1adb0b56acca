use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;
use tunnel_core::{CoreError, ShortenerError};

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Shortener(ShortenerError),
    InvalidCode(CoreError),
    NotFound(&'static str),
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        Self::Shortener(value)
    }
}

impl From<CoreError> for AppError {
    fn from(value: CoreError) -> Self {
        Self::InvalidCode(value)
    }
}

impl AppError {
    fn status_and_detail(self) -> (StatusCode, String) {
        match self {
            AppError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.to_string()),
            AppError::InvalidCode(_) | AppError::Shortener(ShortenerError::InvalidShortCode(_)) => (
                StatusCode::BAD_REQUEST,
                "custom code must be 3-12 letters/numbers".to_string(),
            ),
            AppError::Shortener(ShortenerError::AliasConflict(_)) => (
                StatusCode::CONFLICT,
                "custom code already exists".to_string(),
            ),
            AppError::Shortener(ShortenerError::InvalidUrl(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Shortener(ShortenerError::InvalidTtl(_)) => {
                (StatusCode::BAD_REQUEST, "ttl must be positive".to_string())
            }
            AppError::Shortener(ShortenerError::CodeSpaceExhausted { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "could not find a free code".to_string(),
            ),
            AppError::Shortener(ShortenerError::Storage(message)) => {
                error!(error = %message, "link storage failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal storage error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
