//! Error types for the FinSight client core

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for client and calculator operations
pub type Result<T> = std::result::Result<T, FinsightError>;

#[derive(Error, Debug)]
pub enum FinsightError {

    // =============================
    // Session / Auth Errors
    // =============================

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    // =============================
    // Remote API Errors
    // =============================

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("Server error {status}: {body}")]
    Server { status: StatusCode, body: String },

    // =============================
    // Local Errors
    // =============================

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token store error: {0}")]
    TokenStore(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FinsightError {
    /// Classify a non-success HTTP response
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => FinsightError::Unauthorized(body),
            StatusCode::FORBIDDEN => FinsightError::Forbidden(body),
            StatusCode::NOT_FOUND => FinsightError::NotFound(body),
            s if s.is_server_error() => FinsightError::Server { status: s, body },
            s => FinsightError::Api { status: s, body },
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FinsightError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            FinsightError::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            FinsightError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            FinsightError::Api { status, .. } | FinsightError::Server { status, .. } => {
                Some(*status)
            }
            FinsightError::HttpError(e) => e.status(),
            _ => None,
        }
    }

    /// Generic message suitable for showing to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            FinsightError::HttpError(e) if e.is_connect() || e.is_timeout() => {
                "Network error. Please check your connection and ensure the backend server is running."
            }
            FinsightError::AuthenticationRequired | FinsightError::Unauthorized(_) => {
                "Authentication failed. Please sign in again."
            }
            FinsightError::NotFound(_) => "API endpoint not found. Please check backend configuration.",
            FinsightError::Forbidden(_) => "Access denied to this content",
            FinsightError::Server { .. } => "Server error. Please try again later.",
            FinsightError::InvalidInput(_) => "Some of the values entered are not valid.",
            _ => "Unable to load data. Please try again later.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            FinsightError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            FinsightError::Unauthorized(_)
        ));
        assert!(matches!(
            FinsightError::from_status(StatusCode::BAD_GATEWAY, String::new()),
            FinsightError::Server { .. }
        ));
        assert!(matches!(
            FinsightError::from_status(StatusCode::BAD_REQUEST, "{}".into()),
            FinsightError::Api { .. }
        ));
    }

    #[test]
    fn test_user_messages() {
        let err = FinsightError::from_status(StatusCode::FORBIDDEN, String::new());
        assert_eq!(err.user_message(), "Access denied to this content");
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));

        let err = FinsightError::AuthenticationRequired;
        assert!(err.user_message().starts_with("Authentication failed"));
        assert_eq!(err.status(), None);
    }
}
