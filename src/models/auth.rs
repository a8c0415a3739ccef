//! Common error type for the login flow
//!
//! Every operation of the flow reports failures through [`AppError`]. Handlers
//! catch these at the interaction boundary and turn them into a visible notice,
//! so the variants carry a message that is safe to show to the user.

use thiserror::Error;

/// Errors raised by the authentication, profile, storage and chat operations
#[derive(Debug, Error)]
pub enum AppError {
    /// Static client configuration is missing or malformed.
    /// Fatal for the session bootstrap that hit it.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The authorization code could not be exchanged for a token
    #[error("Failed to fetch token: {0}")]
    AuthExchange(String),

    /// The userinfo endpoint did not return a usable profile
    #[error("Failed to fetch user information: {0}")]
    ProfileFetch(String),

    /// The text-generation API call failed
    #[error("Error with chatbot response: {0}")]
    ChatCompletion(String),

    /// The credential store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// User supplied input was rejected before any side effect
    #[error("{0}")]
    InvalidInput(String),

    /// The session already holds a credential
    #[error("Session is already authenticated")]
    AlreadyAuthenticated,

    /// The operation needs an authenticated session with a known email
    #[error("Session is not authenticated")]
    NotAuthenticated,
}

impl AppError {
    /// Whether the error ends the session bootstrap instead of being shown inline
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Short machine-readable tag, used in log lines
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::AuthExchange(_) => "auth_exchange",
            Self::ProfileFetch(_) => "profile_fetch",
            Self::ChatCompletion(_) => "chat_completion",
            Self::Storage(_) => "storage",
            Self::InvalidInput(_) => "invalid_input",
            Self::AlreadyAuthenticated => "already_authenticated",
            Self::NotAuthenticated => "not_authenticated",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_errors_are_fatal() {
        assert!(AppError::Configuration("missing file".to_string()).is_fatal());
        assert!(!AppError::AuthExchange("invalid_grant".to_string()).is_fatal());
        assert!(!AppError::ProfileFetch("401".to_string()).is_fatal());
        assert!(!AppError::ChatCompletion("timeout".to_string()).is_fatal());
    }

    #[test]
    fn test_display_messages_are_user_facing() {
        let err = AppError::ProfileFetch("HTTP 401".to_string());
        assert_eq!(err.to_string(), "Failed to fetch user information: HTTP 401");

        let err = AppError::InvalidInput("Please enter both values.".to_string());
        assert_eq!(err.to_string(), "Please enter both values.");
    }
}
