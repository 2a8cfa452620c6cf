//! Error types
//!
//! `ApiError` describes what went wrong on the wire, `SessionError` is what
//! the session controller reports to its caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Failure of a single call to the placement API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure
    #[error("{0}")]
    Transport(String),
    /// HTTP 429 from the server
    #[error("Request failed with status code 429")]
    RateLimited,
    /// Any other non-success status
    #[error("Request failed with status code {0}")]
    Status(u16),
    /// The body was not the JSON shape we expected
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a non-success HTTP status
    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            Self::RateLimited
        } else {
            Self::Status(status)
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Failure reported by the session controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Form input rejected before any network call
    #[error("{0}")]
    Validation(ValidationErrors),
    /// Login rejected or answered with an unexpected shape
    #[error("Invalid credentials!")]
    InvalidCredentials,
    /// Network failure; carries the underlying message
    #[error("{0}")]
    Transport(String),
    #[error("A student session is already active; log out first")]
    AlreadyAuthenticated,
    #[error("No student is logged in")]
    NotAuthenticated,
    /// The session was logged out while the call was in flight
    #[error("Login cancelled")]
    Cancelled,
}

/// Failure loading or saving the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_maps_to_rate_limited() {
        assert_eq!(ApiError::from_status(429), ApiError::RateLimited);
        assert_eq!(ApiError::from_status(503), ApiError::Status(503));
    }

    #[test]
    fn messages_match_user_facing_text() {
        assert_eq!(
            SessionError::InvalidCredentials.to_string(),
            "Invalid credentials!"
        );
        assert_eq!(
            ApiError::Status(500).to_string(),
            "Request failed with status code 500"
        );
    }
}
