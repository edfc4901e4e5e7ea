//! Error types for the ticket portal.

use thiserror::Error;

/// Message shown when the ticket service gives no usable explanation
pub const GENERIC_SERVICE_MESSAGE: &str = "Something went wrong, please try again";

/// Failure taxonomy surfaced to visitors
///
/// Nothing here is fatal: every variant maps to a recoverable, user-visible
/// notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// Requested ticket type does not exist
    #[error("Ticket type not found: {0}")]
    NotFound(String),

    /// Missing or malformed visitor input; nothing was sent
    #[error("{0}")]
    Validation(String),

    /// The ticket service failed or rejected the call
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl PortalError {
    /// Text suitable for a notice
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "This ticket type does not exist".to_string(),
            Self::Validation(message) => message.clone(),
            Self::Service(error) => error.user_message(),
        }
    }
}

/// Errors from the remote ticket/payment service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never got a response (connection, DNS, TLS...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Ticket service rejected the request ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Human-readable message from the response body, if any
        message: Option<String>,
    },

    /// The response body could not be decoded
    #[error("Invalid response from ticket service: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Service-provided message, or the generic fallback
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_SERVICE_MESSAGE.to_string(),
        }
    }
}

/// Errors computing the secure purchase entry address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The address has no host to keep
    #[error("Address has no host: {0}")]
    MissingHost(String),

    /// The visitor's address could not be reconstructed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The address scheme cannot be upgraded
    #[error("Cannot switch scheme of {0} to https")]
    SchemeChange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_is_passed_through() {
        let error = ServiceError::Rejected {
            status: 409,
            message: Some("Ticket no longer available".to_string()),
        };
        assert_eq!(error.user_message(), "Ticket no longer available");
        assert_eq!(
            PortalError::from(error).user_message(),
            "Ticket no longer available"
        );
    }

    #[test]
    fn test_other_failures_use_generic_message() {
        let blank = ServiceError::Rejected {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), GENERIC_SERVICE_MESSAGE);
        assert_eq!(
            ServiceError::Transport("connection refused".to_string()).user_message(),
            GENERIC_SERVICE_MESSAGE
        );
    }

    #[test]
    fn test_display() {
        let error = ServiceError::Rejected {
            status: 402,
            message: None,
        };
        assert_eq!(
            error.to_string(),
            "Ticket service rejected the request (402): no message"
        );
    }
}
