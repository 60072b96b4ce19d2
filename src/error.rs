//! Error types and handling for the `PlaceMap` application

use thiserror::Error;

/// Main error type for the `PlaceMap` application
#[derive(Error, Debug)]
pub enum PlaceMapError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The places backend answered with a non-success status
    #[error("Backend rejected request with status {status}: {}", message.as_deref().unwrap_or("no details"))]
    Rejected { status: u16, message: Option<String> },

    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The backend answered with a body we could not understand
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A page session that was never mounted or has been evicted
    #[error("Unknown session: {id}")]
    SessionNotFound { id: String },
}

impl PlaceMapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new rejection error
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        Self::Rejected { status, message }
    }

    /// Create a new invalid-response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new unknown-session error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    /// Text supplied by the backend in its `{error}` body, if any
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PlaceMapError::Rejected {
                message: Some(message),
                ..
            } if !message.is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlaceMapError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            PlaceMapError::Rejected { .. } => match self.server_message() {
                Some(message) => message.to_string(),
                None => "The places service rejected the request.".to_string(),
            },
            PlaceMapError::Transport { .. } | PlaceMapError::InvalidResponse { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
            PlaceMapError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            PlaceMapError::SessionNotFound { .. } => {
                "This page has expired. Please reload.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = PlaceMapError::config("bad url");
        assert!(matches!(config_err, PlaceMapError::Config { .. }));

        let rejected = PlaceMapError::rejected(400, Some("Missing required fields".into()));
        assert!(matches!(rejected, PlaceMapError::Rejected { status: 400, .. }));

        let validation_err = PlaceMapError::validation("radius");
        assert!(matches!(validation_err, PlaceMapError::Validation { .. }));
    }

    #[test]
    fn test_server_message_only_for_rejections_with_text() {
        let with_text = PlaceMapError::rejected(404, Some("No places found.".into()));
        assert_eq!(with_text.server_message(), Some("No places found."));

        let empty = PlaceMapError::rejected(500, Some(String::new()));
        assert_eq!(empty.server_message(), None);

        let bare = PlaceMapError::rejected(502, None);
        assert_eq!(bare.server_message(), None);

        let other = PlaceMapError::invalid_response("not json");
        assert_eq!(other.server_message(), None);
    }

    #[test]
    fn test_user_messages() {
        let rejected = PlaceMapError::rejected(400, Some("Missing required fields".into()));
        assert_eq!(rejected.user_message(), "Missing required fields");

        let invalid = PlaceMapError::invalid_response("garbage");
        assert!(invalid.user_message().contains("Something went wrong"));

        let validation_err = PlaceMapError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_rejected_display_without_message() {
        let err = PlaceMapError::rejected(503, None);
        assert_eq!(
            err.to_string(),
            "Backend rejected request with status 503: no details"
        );
    }

    #[test]
    fn test_expired_session_message() {
        let err = PlaceMapError::session_not_found("00000000deadbeef");
        assert_eq!(err.to_string(), "Unknown session: 00000000deadbeef");
        assert_eq!(err.user_message(), "This page has expired. Please reload.");
    }
}
