//! API error types with JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use clubpage_core::ReorderError;
use clubpage_store::StoreError;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Store error.
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl From<ReorderError> for ApiError {
    fn from(err: ReorderError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(e) => match e {
                StoreError::NotFound { .. } => "NOT_FOUND",
                StoreError::PermissionDenied { .. } => "FORBIDDEN",
                StoreError::OrderRejected(_) => "ORDER_REJECTED",
                StoreError::InvalidInput(_) => "BAD_REQUEST",
                StoreError::Conflict(_) => "CONFLICT",
                _ => "STORAGE_ERROR",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) => match e {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                // Reorder endpoints report ownership and membership failures
                // alike as 400.
                StoreError::OrderRejected(_) => StatusCode::BAD_REQUEST,
                StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "ORDER_REJECTED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        // Database errors are logged, not echoed.
        let message = match &self {
            Self::Store(StoreError::Connection(_)) => "database unavailable".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use clubpage_store::RejectReason;
    use uuid::Uuid;

    #[test]
    fn test_order_rejections_are_bad_requests() {
        for reason in [
            RejectReason::NotOwner,
            RejectReason::NotDense,
            RejectReason::ForeignItem(Uuid::nil()),
            RejectReason::Duplicate(Uuid::nil()),
        ] {
            let err = ApiError::from(StoreError::from(reason));
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(err.code(), "ORDER_REJECTED");
        }
    }

    #[test]
    fn test_store_status_mapping() {
        let missing = ApiError::from(StoreError::NotFound {
            entity: "notice",
            id: Uuid::nil(),
        });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let denied = ApiError::from(StoreError::PermissionDenied {
            operation: "delete link".into(),
            scope: "x".into(),
        });
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

        let broken = ApiError::from(StoreError::MigrationError("boom".into()));
        assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_handle_conflict_is_409() {
        let err = ApiError::from(StoreError::Conflict("handle 'skipper' is already taken".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_reorder_error_is_bad_request() {
        let err = ApiError::from(ReorderError::ValidationFailed("gap".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("gap"));
    }
}
