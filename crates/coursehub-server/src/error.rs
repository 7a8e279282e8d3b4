//! API error taxonomy and its HTTP mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::storage::DatabaseError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The caller's identity is missing or not permitted.
    #[error("Unauthorized")]
    Authorization,

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Storage or service failure. The message is logged, never returned.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Authorization => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            other => Self::Unexpected(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Unexpected(detail) => {
                error!(error = %detail, "Request failed");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_not_found_maps_to_not_found() {
        let err: ApiError = DatabaseError::NotFound("Course c1".into()).into();
        assert!(matches!(err, ApiError::NotFound(ref what) if what == "Course c1"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn query_failure_is_unexpected() {
        let err: ApiError = DatabaseError::Query("disk I/O error".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unexpected_error_hides_detail() {
        let resp = ApiError::Unexpected("sqlite: disk I/O error".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Internal Server Error"));
        assert!(!text.contains("sqlite"));
    }

    #[test]
    fn authorization_is_401() {
        assert_eq!(ApiError::Authorization.status(), StatusCode::UNAUTHORIZED);
    }
}
