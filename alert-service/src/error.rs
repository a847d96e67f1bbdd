use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::models::response::ApiResponse;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlertError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AlertError {
    pub fn code(&self) -> &'static str {
        match self {
            AlertError::Validation(_) => "VALIDATION_ERROR",
            AlertError::PermissionDenied(_) => "PERMISSION_DENIED",
            AlertError::NotFound(_) => "NOT_FOUND",
            AlertError::Delivery(_) => "DELIVERY_ERROR",
            AlertError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(
            self,
            AlertError::Validation(_) | AlertError::PermissionDenied(_) | AlertError::NotFound(_)
        )
    }

    pub fn into_caller_error(self) -> Self {
        if self.is_recognized() {
            return self;
        }

        match self {
            AlertError::Internal(_) => self,
            other => AlertError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AlertError {
    fn from(err: anyhow::Error) -> Self {
        AlertError::Internal(err.to_string())
    }
}

impl From<tokio_postgres::Error> for AlertError {
    fn from(err: tokio_postgres::Error) -> Self {
        AlertError::Internal(format!("Database error: {}", err))
    }
}

impl From<redis::RedisError> for AlertError {
    fn from(err: redis::RedisError) -> Self {
        AlertError::Internal(format!("Cache error: {}", err))
    }
}

impl IntoResponse for AlertError {
    fn into_response(self) -> Response {
        let status = match &self {
            AlertError::Validation(_) => StatusCode::BAD_REQUEST,
            AlertError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AlertError::NotFound(_) => StatusCode::NOT_FOUND,
            AlertError::Delivery(msg) => {
                warn!(error = %msg, "Delivery error returned to caller");
                StatusCode::BAD_GATEWAY
            }
            AlertError::Internal(msg) => {
                error!(error = %msg, "Internal error returned to caller");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiResponse::<()>::error(self.code().to_string(), self.to_string());

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_rejections_pass_through() {
        let err = AlertError::PermissionDenied("not an admin".to_string());
        assert_eq!(err.clone().into_caller_error(), err);

        let err = AlertError::Validation("title is required".to_string());
        assert_eq!(err.clone().into_caller_error(), err);

        let err = AlertError::NotFound("user u1".to_string());
        assert_eq!(err.clone().into_caller_error(), err);
    }

    #[test]
    fn delivery_errors_become_internal_with_message() {
        let err = AlertError::Delivery("FCM returned 503".to_string()).into_caller_error();

        match err {
            AlertError::Internal(msg) => assert!(msg.contains("FCM returned 503"), "{msg}"),
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn internal_is_not_double_wrapped() {
        let err = AlertError::Internal("boom".to_string()).into_caller_error();
        assert_eq!(err, AlertError::Internal("boom".to_string()));
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let cases = [
            (AlertError::Validation(String::new()), StatusCode::BAD_REQUEST),
            (AlertError::PermissionDenied(String::new()), StatusCode::FORBIDDEN),
            (AlertError::NotFound(String::new()), StatusCode::NOT_FOUND),
            (AlertError::Delivery(String::new()), StatusCode::BAD_GATEWAY),
            (AlertError::Internal(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
