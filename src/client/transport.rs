//! Shared HTTP transport settings.
//!
//! Every instance of a registry talks through the same `reqwest::Client`,
//! so connection pooling is shared across the fleet. The settings come from
//! the reserved `ws` key of the `cortex` configuration section.

use crate::core::{ClientError, Result};

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("cortexbridge/", env!("CARGO_PKG_VERSION"));

/// Transport configuration shared by all instances.
///
/// No timeout is set by default: long-polling calls rely on the engine
/// honouring its own wait bound.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSettings {
    /// Total request timeout, in seconds in configuration.
    #[serde(default, deserialize_with = "seconds")]
    pub timeout: Option<Duration>,

    /// Connection timeout, in seconds in configuration.
    #[serde(
        default,
        alias = "connecttimeout",
        alias = "connect_timeout",
        deserialize_with = "seconds"
    )]
    pub connect_timeout: Option<Duration>,

    /// Proxy URL applied to all schemes.
    #[serde(default)]
    pub proxy: Option<String>,

    /// User agent override.
    #[serde(default, alias = "useragent", alias = "user_agent")]
    pub user_agent: Option<String>,
}

fn seconds<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}

impl TransportSettings {
    /// Creates default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the proxy URL.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the HTTP client.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| {
                ClientError::configuration(format!("invalid proxy '{}': {}", proxy, e))
            })?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| ClientError::configuration(format!("Failed to create HTTP client: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_seconds() {
        let settings: TransportSettings = serde_json::from_value(json!({
            "timeout": 30,
            "connectTimeout": 5,
            "userAgent": "thehive"
        }))
        .unwrap();

        assert_eq!(settings.timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(settings.user_agent.as_deref(), Some("thehive"));
        assert_eq!(settings.proxy, None);
    }

    #[test]
    fn test_lowercased_keys_accepted() {
        let settings: TransportSettings =
            serde_json::from_value(json!({"connecttimeout": 2, "useragent": "x"})).unwrap();
        assert_eq!(settings.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(settings.user_agent.as_deref(), Some("x"));
    }

    #[test]
    fn test_build_client() {
        let settings = TransportSettings::new()
            .with_timeout(Duration::from_secs(10))
            .with_connect_timeout(Duration::from_secs(2))
            .with_proxy("http://proxy.local:3128");
        assert!(settings.build_client().is_ok());
    }

    #[test]
    fn test_invalid_proxy_is_configuration_error() {
        let settings = TransportSettings::new().with_proxy("not a url");
        assert!(matches!(
            settings.build_client(),
            Err(ClientError::Configuration { .. })
        ));
    }
}
