//! Mapping of [`Error`] onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::Error;

/// Message returned for every failure that is not the caller's fault.
const INTERNAL_MESSAGE: &str = "internal server error";

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub error: String,
    /// HTTP status code, repeated in the body.
    pub code: u16,
}

impl Error {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        let body = ErrorResponse {
            error: message,
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::not_found(1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::invalid_input("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::StoreLock.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::internal("oops").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    async fn body_of(error: Error) -> ErrorResponse {
        let response = error.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_internal_details_not_exposed() {
        let body = body_of(Error::internal("secret path /var/db")).await;
        assert_eq!(body.code, 500);
        assert_eq!(body.error, INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_client_errors_carry_message() {
        let body = body_of(Error::invalid_input("invalid departTime: \"x\"")).await;
        assert_eq!(body.code, 400);
        assert!(body.error.contains("departTime"));

        let body = body_of(Error::not_found("abc")).await;
        assert_eq!(body.code, 404);
        assert_eq!(body.error, "flight with id abc not found");
    }
}
