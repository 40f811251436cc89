use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::store::StoreError;

/// API-level error. Each variant is one HTTP class; the wire body is
/// `{"error": <class>, "message": <detail>}` with the detail omitted for
/// internal failures, whose cause is only logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("internal server error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Logs the cause and returns the opaque internal error.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", context, err);
        ApiError::Internal
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => ApiError::Conflict(message),
            StoreError::Database(e) => {
                tracing::error!("database error: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, class, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "Bad request", Some(m)),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "Unauthorized", Some(m)),
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, "Forbidden", Some(m)),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "Not found", Some(m)),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, "Conflict", Some(m)),
            ApiError::Unavailable(m) => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable", Some(m))
            }
            ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let mut body = json!({ "error": class });
        if let Some(message) = message {
            body["message"] = json!(message);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_conflict_store_errors() {
        let err = ApiError::from(StoreError::Conflict("code taken".to_string()));
        assert!(matches!(err, ApiError::Conflict(m) if m == "code taken"));
    }

    #[test]
    fn test_hides_database_details() {
        let err = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, ApiError::Internal));
    }

    #[test]
    fn test_response_status_matches_class() {
        let res = ApiError::BadRequest("items required".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = ApiError::Internal.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
