//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use storage::SourceError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing {0}")]
    MissingParameter(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingParameter(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Source(SourceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Source(SourceError::Csv(_))
            | ApiError::Source(SourceError::InvalidWindow(_)) => StatusCode::BAD_REQUEST,
            ApiError::Source(SourceError::DatabaseError(_)) | ApiError::Internal(_) => {
                tracing::error!("Internal error: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Reject absent or blank parameters
pub fn required(value: Option<String>, name: &'static str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::MissingParameter(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(required(Some("mc-1".to_string()), "motorcycle_id").unwrap(), "mc-1");
        let err = required(Some("  ".to_string()), "motorcycle_id").unwrap_err();
        assert_eq!(err.to_string(), "Missing motorcycle_id");
        assert!(required(None, "brand").is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::MissingParameter("motorcycle_id").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Source(SourceError::NotFound("mc-1".to_string())).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("join error".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
