//! HTTP error responses.
//!
//! Bridges portal errors to JSON error bodies via Axum's `IntoResponse`.

use crate::error::{GatewayError, PortalError, ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Error returned by portal handlers
///
/// Server-side failures are logged when converted into a response; the body
/// only carries the user-facing message.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new error
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause (logged, never sent)
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 400: malformed request
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 404: the session header is missing, malformed or expired
    #[must_use]
    pub fn session_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            "Your session has expired, please reload the page",
        )
    }

    /// 502: the ticket service failed
    #[must_use]
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "TICKET_SERVICE_ERROR", message)
    }

    /// HTTP status of this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Request failed"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(error: ServiceError) -> Self {
        Self::bad_gateway(error.user_message()).with_source(error)
    }
}

impl From<PortalError> for AppError {
    fn from(error: PortalError) -> Self {
        match error {
            PortalError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", error.user_message())
            },
            PortalError::Validation(message) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
            },
            PortalError::Service(error) => error.into(),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(error: GatewayError) -> Self {
        Self::bad_request("Cannot determine the portal address").with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_service_rejection_keeps_message() {
        let err = AppError::from(ServiceError::Rejected {
            status: 503,
            message: Some("Maintenance in progress".to_string()),
        });

        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "TICKET_SERVICE_ERROR");
        assert_eq!(
            err.to_string(),
            "[TICKET_SERVICE_ERROR] Maintenance in progress"
        );
    }

    #[test]
    fn test_portal_error_mapping() {
        let validation = AppError::from(PortalError::Validation("bad phone".to_string()));
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = AppError::from(PortalError::NotFound("ghost".to_string()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_gateway_error_is_client_error() {
        let err = AppError::from(GatewayError::MissingHost("/captive".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
