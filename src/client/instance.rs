//! Identity and addressing of one Cortex instance.

use crate::core::Authentication;

/// One configured Cortex endpoint.
///
/// Immutable once built. The base URL never ends with a slash.
#[derive(Debug)]
pub struct CortexInstance {
    name: String,
    base_url: String,
    auth: Authentication,
}

impl CortexInstance {
    /// Creates an unauthenticated instance.
    ///
    /// Trailing slashes are stripped from `base_url`.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: Authentication::NoAuth,
        }
    }

    /// Sets the authentication strategy.
    pub fn with_auth(mut self, auth: Authentication) -> Self {
        self.auth = auth;
        self
    }

    /// Instance name, unique within a registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authentication strategy.
    pub fn auth(&self) -> &Authentication {
        &self.auth
    }

    /// Full URL of an API path relative to the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_stripped() {
        let instance = CortexInstance::new("local", "http://cortex:9001///");
        assert_eq!(instance.base_url(), "http://cortex:9001");
        assert_eq!(
            instance.url_for("api/status"),
            "http://cortex:9001/api/status"
        );
    }

    #[test]
    fn test_default_auth_is_none() {
        let instance = CortexInstance::new("local", "http://cortex:9001");
        assert!(instance.auth().is_none());

        let instance = instance.with_auth(Authentication::bearer("k"));
        assert_eq!(instance.auth().kind(), "bearer");
    }
}
