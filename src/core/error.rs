//! Error types for the cortexbridge library.
//!
//! Every remote failure is funnelled into [`ClientError`]. Responses that
//! reach the engine but come back outside the 2xx range (or cannot be
//! decoded) carry a [`CortexError`] with enough context to rebuild a
//! diagnostic. The library never panics; all errors are returned as
//! `Result` values.

use thiserror::Error;

/// A response from a Cortex instance that could not be turned into a result.
///
/// Produced for any status outside `[200, 300)` and for 2xx bodies that the
/// caller's decoder rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cortex error on {url} ({status}): {message}")]
pub struct CortexError {
    /// HTTP status code returned by the instance.
    pub status: u16,
    /// Full request URL, without the query string.
    pub url: String,
    /// Response body, or a decode diagnostic.
    pub message: String,
}

impl CortexError {
    /// Creates a new `CortexError`.
    pub fn new(status: u16, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            message: message.into(),
        }
    }
}

/// The main error type for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The instance answered, but not with a usable result.
    #[error(transparent)]
    Cortex(#[from] CortexError),

    /// A search returned no match.
    ///
    /// Kept apart from [`ClientError::Cortex`] so callers can tell a broken
    /// service from an entity that does not exist.
    #[error("{entity} '{key}' not found")]
    NotFound {
        /// Kind of entity that was looked up ("analyzer", "worker").
        entity: &'static str,
        /// The name or id used for the lookup.
        key: String,
    },

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Full request URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Reading a file artifact from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact cannot be encoded for submission.
    #[error("invalid artifact: {reason}")]
    InvalidArtifact {
        /// What is wrong with the artifact.
        reason: String,
    },

    /// Configuration is missing or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl ClientError {
    /// Returns `true` if this error is a not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Cortex(e) => Some(e.status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the request URL associated with this error, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Cortex(e) => Some(&e.url),
            Self::Transport { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Creates a `NotFound` error.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Creates a `Transport` error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cortex_error_display() {
        let err = CortexError::new(500, "http://cortex/api/status", "boom");
        let text = err.to_string();
        assert!(text.contains("http://cortex/api/status"));
        assert!(text.contains("500"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn test_client_error_status_and_url() {
        let err: ClientError = CortexError::new(404, "http://cortex/api/analyzer/x", "").into();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.url(), Some("http://cortex/api/analyzer/x"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found() {
        let err = ClientError::not_found("analyzer", "MaxMind_GeoIP");
        assert!(err.is_not_found());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "analyzer 'MaxMind_GeoIP' not found");
    }

    #[test]
    fn test_configuration_error_display() {
        let err = ClientError::configuration("cortex.a.url is missing");
        assert!(err.to_string().contains("cortex.a.url is missing"));
    }
}
