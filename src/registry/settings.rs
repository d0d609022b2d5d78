//! Configuration model for the `cortex` section.
//!
//! ```toml
//! [cortex.ws]
//! timeout = 60
//!
//! [cortex.local]
//! url = "http://127.0.0.1:9001/"
//! key = "api-key"
//!
//! [cortex.legacy]
//! url = "https://cortex.example.org"
//! basicAuth = true
//! username = "thehive"
//! password = "secret"
//! ```

use crate::client::{CortexInstance, TransportSettings};
use crate::core::{Authentication, ClientError, Result};

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Name of the configuration section holding the instances.
pub const CORTEX_SECTION: &str = "cortex";

/// Reserved key of the section holding shared transport settings.
pub const TRANSPORT_KEY: &str = "ws";

/// Prefix of environment variables overriding file configuration.
///
/// `CORTEXBRIDGE__CORTEX__LOCAL__URL` sets `cortex.local.url`.
pub const ENV_PREFIX: &str = "CORTEXBRIDGE";

/// Settings of one instance, as found in configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSettings {
    /// Instance name; defaults to the configuration key.
    #[serde(default)]
    pub name: Option<String>,

    /// Base URL (required).
    #[serde(default)]
    pub url: Option<String>,

    /// API key, sent as a bearer token.
    #[serde(default)]
    pub key: Option<SecretString>,

    /// Enables HTTP Basic authentication.
    #[serde(default, alias = "basicauth", alias = "basic_auth")]
    pub basic_auth: Option<bool>,

    /// Basic-auth user name.
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<SecretString>,
}

impl InstanceSettings {
    /// Builds the instance declared under `key`.
    ///
    /// Fails if the URL is missing. Authentication precedence: an API key
    /// wins; otherwise basic auth when enabled with both credentials;
    /// otherwise none.
    pub fn into_instance(self, key: &str) -> Result<CortexInstance> {
        let url = self
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                ClientError::configuration(format!("{}.{}.url is missing", CORTEX_SECTION, key))
            })?;
        let name = self.name.unwrap_or_else(|| key.to_string());

        let auth = match (self.key, self.basic_auth, self.username, self.password) {
            (Some(token), _, _, _) => Authentication::Bearer { token },
            (None, Some(true), Some(username), Some(password)) => {
                Authentication::Basic { username, password }
            }
            (None, Some(true), _, _) => {
                warn!(
                    instance = %name,
                    "basicAuth is enabled without both username and password, requests will be unauthenticated"
                );
                Authentication::NoAuth
            }
            _ => Authentication::NoAuth,
        };

        Ok(CortexInstance::new(name, url).with_auth(auth))
    }
}

/// The parsed `cortex` section.
#[derive(Debug, Default)]
pub struct CortexSettings {
    /// Shared transport settings (`cortex.ws`).
    pub transport: TransportSettings,

    /// Instance settings keyed by configuration key, sorted by key.
    pub instances: Vec<(String, InstanceSettings)>,
}

impl CortexSettings {
    /// Parses the `cortex` section of a configuration tree.
    ///
    /// A tree without the section yields no instances. Scalar entries of
    /// the section are not instances and are skipped.
    pub fn from_value(root: &Value) -> Result<Self> {
        let Some(section) = root.get(CORTEX_SECTION) else {
            return Ok(Self::default());
        };
        let section = section.as_object().ok_or_else(|| {
            ClientError::configuration(format!("`{}` must be a table", CORTEX_SECTION))
        })?;

        let mut settings = Self::default();
        for (key, value) in section {
            if key == TRANSPORT_KEY {
                settings.transport = TransportSettings::deserialize(value).map_err(|e| {
                    ClientError::configuration(format!(
                        "{}.{}: {}",
                        CORTEX_SECTION, TRANSPORT_KEY, e
                    ))
                })?;
                continue;
            }
            if !value.is_object() {
                trace!(key = %key, "Skipping non-table entry of the cortex section");
                continue;
            }

            let instance = InstanceSettings::deserialize(value).map_err(|e| {
                ClientError::configuration(format!("{}.{}: {}", CORTEX_SECTION, key, e))
            })?;
            settings.instances.push((key.clone(), instance));
        }

        Ok(settings)
    }

    /// Loads settings from an optional file and the environment.
    ///
    /// Environment variables prefixed with [`ENV_PREFIX`] override the file,
    /// using `__` as the key separator.
    ///
    /// Keys come back lowercased from the layered configuration, so instance
    /// keys are restored to their spelling in a TOML or JSON file. Instances
    /// only declared in the environment keep lowercase names.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let root: Value = builder.build()?.try_deserialize()?;
        let mut settings = Self::from_value(&root)?;

        if let Some(path) = path {
            let spelled = file_instance_keys(path)?;
            for (key, _) in settings.instances.iter_mut() {
                let lowered = key.to_lowercase();
                if let Some(original) = spelled.iter().find(|s| s.to_lowercase() == lowered) {
                    *key = original.clone();
                }
            }
        }

        Ok(settings)
    }
}

/// Keys of the file's `cortex` section, spelled as written.
///
/// Resolves an extension-less path the way the file source does, trying
/// `.toml` then `.json`. Other formats yield no keys.
fn file_instance_keys(path: &str) -> Result<Vec<String>> {
    let path = Path::new(path);
    let candidates: Vec<PathBuf> = if path.extension().is_some() {
        vec![path.to_path_buf()]
    } else {
        ["toml", "json"]
            .iter()
            .map(|ext| path.with_extension(ext))
            .collect()
    };
    let Some(file) = candidates.into_iter().find(|p| p.is_file()) else {
        return Ok(Vec::new());
    };

    let text = std::fs::read_to_string(&file)?;
    let parse_error = |e: &dyn std::fmt::Display| {
        ClientError::configuration(format!("{}: {}", file.display(), e))
    };
    let root: Value = match file.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text).map_err(|e| parse_error(&e))?,
        Some("json") => serde_json::from_str(&text).map_err(|e| parse_error(&e))?,
        _ => return Ok(Vec::new()),
    };

    Ok(root
        .get(CORTEX_SECTION)
        .and_then(Value::as_object)
        .map(|section| section.keys().cloned().collect())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::time::Duration;

    fn parse(tree: Value) -> Result<Vec<CortexInstance>> {
        CortexSettings::from_value(&tree)?
            .instances
            .into_iter()
            .map(|(key, settings)| settings.into_instance(&key))
            .collect()
    }

    #[test]
    fn test_key_and_no_auth() {
        let instances = parse(json!({
            "cortex": {
                "a": { "url": "http://x" },
                "b": { "url": "http://y/", "key": "k" }
            }
        }))
        .unwrap();

        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].name(), "a");
        assert!(instances[0].auth().is_none());
        assert_eq!(instances[1].name(), "b");
        assert_eq!(instances[1].base_url(), "http://y");
        assert_eq!(instances[1].auth().kind(), "bearer");
    }

    #[test]
    fn test_key_takes_precedence_over_basic() {
        let instances = parse(json!({
            "cortex": {
                "a": {
                    "url": "http://x",
                    "key": "k",
                    "basicAuth": true,
                    "username": "u",
                    "password": "p"
                }
            }
        }))
        .unwrap();
        assert_eq!(instances[0].auth().kind(), "bearer");
    }

    #[test]
    fn test_basic_requires_flag_and_both_credentials() {
        let instances = parse(json!({
            "cortex": {
                "enabled": { "url": "http://x", "basicAuth": true, "username": "u", "password": "p" },
                "flag_off": { "url": "http://x", "basicAuth": false, "username": "u", "password": "p" },
                "no_flag": { "url": "http://x", "username": "u", "password": "p" },
                "no_password": { "url": "http://x", "basicAuth": true, "username": "u" }
            }
        }))
        .unwrap();

        let kinds: Vec<_> = instances
            .iter()
            .map(|i| (i.name(), i.auth().kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("enabled", "basic"),
                ("flag_off", "none"),
                ("no_flag", "none"),
                ("no_password", "none"),
            ]
        );
    }

    #[test]
    fn test_missing_url_fails() {
        let err = parse(json!({ "cortex": { "a": {} } })).unwrap_err();
        assert!(matches!(err, ClientError::Configuration { .. }));
        assert!(err.to_string().contains("cortex.a.url"));

        assert!(parse(json!({ "cortex": { "a": { "url": "  " } } })).is_err());
    }

    #[test]
    fn test_ws_and_scalars_are_not_instances() {
        let settings = CortexSettings::from_value(&json!({
            "cortex": {
                "ws": { "timeout": 30 },
                "refreshDelay": "1 minute",
                "a": { "url": "http://x" }
            }
        }))
        .unwrap();

        assert_eq!(settings.transport.timeout, Some(Duration::from_secs(30)));
        assert_eq!(settings.instances.len(), 1);
        assert_eq!(settings.instances[0].0, "a");
    }

    #[test]
    fn test_missing_section_is_empty() {
        let settings = CortexSettings::from_value(&json!({ "play": {} })).unwrap();
        assert!(settings.instances.is_empty());

        assert!(CortexSettings::from_value(&json!({ "cortex": "nope" })).is_err());
    }

    #[test]
    fn test_name_override() {
        let instances = parse(json!({
            "cortex": { "a": { "url": "http://x", "name": "primary" } }
        }))
        .unwrap();
        assert_eq!(instances[0].name(), "primary");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[cortex.ws]
timeout = 45

[cortex.local]
url = "http://127.0.0.1:9001/"
key = "api-key"
"#
        )
        .unwrap();

        let settings = CortexSettings::load(file.path().to_str()).unwrap();
        assert_eq!(settings.transport.timeout, Some(Duration::from_secs(45)));
        assert_eq!(settings.instances.len(), 1);

        let (key, instance) = settings.instances.into_iter().next().unwrap();
        let instance = instance.into_instance(&key).unwrap();
        assert_eq!(instance.base_url(), "http://127.0.0.1:9001");
        assert_eq!(instance.auth().kind(), "bearer");
    }

    #[test]
    fn test_load_keeps_instance_key_case() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[cortex.Primary]
url = "http://x"
basicAuth = true
username = "u"
password = "p"

[cortex.backup]
url = "http://y"
"#
        )
        .unwrap();

        let instances: Vec<CortexInstance> = CortexSettings::load(file.path().to_str())
            .unwrap()
            .instances
            .into_iter()
            .map(|(key, settings)| settings.into_instance(&key).unwrap())
            .collect();

        let primary = instances.iter().find(|i| i.name() == "Primary").unwrap();
        assert_eq!(primary.auth().kind(), "basic");
        assert!(instances.iter().any(|i| i.name() == "backup"));
        assert!(instances.iter().all(|i| i.name() != "primary"));
    }

    #[test]
    fn test_load_keeps_instance_key_case_in_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "cortex": {{ "EU-West": {{ "url": "http://x" }} }} }}"#).unwrap();

        let settings = CortexSettings::load(file.path().to_str()).unwrap();
        assert_eq!(settings.instances[0].0, "EU-West");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = CortexSettings::load(Some("/nonexistent/cortexbridge.toml")).unwrap_err();
        assert!(matches!(err, ClientError::Configuration { .. }));
    }
}
