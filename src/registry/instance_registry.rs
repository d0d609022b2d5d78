//! The set of configured Cortex instances.

use crate::client::{CortexClient, CortexInstance, TransportSettings};
use crate::core::{FleetReport, HealthStatus, Result};
use crate::health;
use crate::registry::settings::CortexSettings;

use serde_json::Value;
use std::sync::Arc;

/// Builder for creating an [`InstanceRegistry`].
#[derive(Debug, Default)]
pub struct InstanceRegistryBuilder {
    instances: Vec<CortexInstance>,
    transport: TransportSettings,
    http: Option<reqwest::Client>,
}

impl InstanceRegistryBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance.
    pub fn add_instance(mut self, instance: CortexInstance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Sets the transport settings used to build the shared HTTP client.
    pub fn with_transport(mut self, transport: TransportSettings) -> Self {
        self.transport = transport;
        self
    }

    /// Uses an existing HTTP client instead of building one.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Builds the registry.
    ///
    /// Instances sharing a name collapse into one: the later definition
    /// replaces the earlier one and keeps its position.
    pub fn build(self) -> Result<InstanceRegistry> {
        let http = match self.http {
            Some(http) => http,
            None => self.transport.build_client()?,
        };

        let mut clients: Vec<Arc<CortexClient>> = Vec::with_capacity(self.instances.len());
        for instance in self.instances {
            let client = Arc::new(CortexClient::new(instance, http.clone()));
            match clients.iter_mut().find(|c| c.name() == client.name()) {
                Some(slot) => {
                    tracing::warn!(
                        instance = client.name(),
                        replaced_url = slot.base_url(),
                        url = client.base_url(),
                        "Duplicate Cortex instance name, later definition wins"
                    );
                    *slot = client;
                }
                None => clients.push(client),
            }
        }

        tracing::info!(
            instance_count = clients.len(),
            instances = ?clients.iter().map(|c| c.name()).collect::<Vec<_>>(),
            "Cortex instance registry built"
        );

        Ok(InstanceRegistry { clients })
    }
}

/// The configured Cortex instances, keyed by name.
///
/// Instances are independent: the registry only hands out clients and
/// aggregates their health.
#[derive(Debug)]
pub struct InstanceRegistry {
    clients: Vec<Arc<CortexClient>>,
}

impl InstanceRegistry {
    /// Creates a new builder.
    pub fn builder() -> InstanceRegistryBuilder {
        InstanceRegistryBuilder::new()
    }

    /// Builds the registry from parsed settings.
    ///
    /// Instances are added sorted by configuration key, so when a `name`
    /// override collides, the alphabetically later key wins. Any invalid
    /// instance aborts the whole construction.
    pub fn from_settings(settings: CortexSettings) -> Result<Self> {
        let mut builder = Self::builder().with_transport(settings.transport);
        for (key, instance) in settings.instances {
            builder = builder.add_instance(instance.into_instance(&key)?);
        }
        builder.build()
    }

    /// Builds the registry from a configuration tree holding a `cortex`
    /// section.
    pub fn from_value(root: &Value) -> Result<Self> {
        Self::from_settings(CortexSettings::from_value(root)?)
    }

    /// Loads configuration from an optional file and the environment, then
    /// builds the registry.
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::from_settings(CortexSettings::load(path)?)
    }

    /// Returns the client with the given name.
    pub fn get(&self, name: &str) -> Option<&Arc<CortexClient>> {
        self.clients.iter().find(|c| c.name() == name)
    }

    /// Returns every client, in insertion order (sorted by configuration key
    /// when built from settings).
    pub fn clients(&self) -> &[Arc<CortexClient>] {
        &self.clients
    }

    /// Returns the instance names, in the same order as [`Self::clients`].
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clients.iter().map(|c| c.name())
    }

    /// Returns the number of instances.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns `true` if no instance is configured.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Probes every instance and reports per-instance status.
    pub async fn status(&self) -> FleetReport {
        health::fleet_status(&self.clients).await
    }

    /// `Ok` only when every instance is healthy.
    pub async fn health(&self) -> HealthStatus {
        health::fleet_health(&self.clients).await
    }
}
