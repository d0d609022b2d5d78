//! Request authentication for Cortex instances.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// How requests to one instance are credentialed.
///
/// Applying a strategy never changes the method, target or body of a
/// request; it only adds credentials. A bearer token and basic credentials
/// are never sent together.
#[derive(Default)]
pub enum Authentication {
    /// Requests are sent as-is.
    #[default]
    NoAuth,

    /// HTTP Basic credentials.
    Basic {
        /// User name.
        username: String,
        /// Password (kept secret).
        password: SecretString,
    },

    /// `Authorization: Bearer <token>` header carrying an API key.
    Bearer {
        /// API key (kept secret).
        token: SecretString,
    },
}

impl Authentication {
    /// Creates a bearer strategy from an API key.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: SecretString::new(token.into().into()),
        }
    }

    /// Creates a basic-auth strategy.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: SecretString::new(password.into().into()),
        }
    }

    /// Returns `true` if requests are sent without credentials.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::NoAuth)
    }

    /// Short label for logs ("none", "basic", "bearer").
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoAuth => "none",
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
        }
    }

    /// Adds this strategy's credentials to a request.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::NoAuth => request,
            Self::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose_secret()))
            }
            Self::Bearer { token } => request.bearer_auth(token.expose_secret()),
        }
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAuth => f.write_str("NoAuth"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    fn build(auth: &Authentication) -> reqwest::Request {
        let client = reqwest::Client::new();
        auth.apply(client.post("http://cortex.local/api/analyzer/_search").body("{}"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_auth_leaves_request_untouched() {
        let request = build(&Authentication::NoAuth);
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().path(), "/api/analyzer/_search");
    }

    #[test]
    fn test_bearer_header() {
        let request = build(&Authentication::bearer("api-key"));
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer api-key"
        );
    }

    #[test]
    fn test_basic_header() {
        let request = build(&Authentication::basic("thehive", "secret"));
        // base64("thehive:secret")
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Basic dGhlaGl2ZTpzZWNyZXQ="
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, b"{}");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let basic = format!("{:?}", Authentication::basic("thehive", "secret"));
        assert!(basic.contains("thehive"));
        assert!(!basic.contains("secret\""));
        let bearer = format!("{:?}", Authentication::bearer("api-key"));
        assert!(!bearer.contains("api-key"));
    }

    #[test]
    fn test_kind() {
        assert_eq!(Authentication::default().kind(), "none");
        assert!(Authentication::default().is_none());
        assert_eq!(Authentication::bearer("k").kind(), "bearer");
        assert_eq!(Authentication::basic("u", "p").kind(), "basic");
    }
}
