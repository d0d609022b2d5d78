//! Core types used throughout the cortexbridge library.
//!
//! This module defines the worker descriptors returned by lookups and the
//! status types produced by health probes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A remotely hosted analysis routine (analyzer or responder).
///
/// Cortex exposes analyzers and responders with the same descriptor shape.
/// Fields this crate does not model are kept in [`Worker::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Worker id, unique within one instance.
    pub id: String,

    /// Worker name, shared by instances exposing the same routine.
    pub name: String,

    /// Worker version.
    #[serde(default)]
    pub version: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Data types this worker accepts.
    #[serde(default)]
    pub data_type_list: Vec<String>,

    /// Names of the instances exposing this worker, in discovery order.
    #[serde(default)]
    pub cortex_ids: Vec<String>,

    /// Any other field returned by the instance.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Analyzers share the worker descriptor.
pub type Analyzer = Worker;

impl Worker {
    /// Creates a descriptor with required fields only.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: String::new(),
            description: String::new(),
            data_type_list: Vec::new(),
            cortex_ids: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Marks this descriptor as coming from the named instance.
    ///
    /// Replaces any previous origin list.
    pub fn with_cortex_id(mut self, instance: impl Into<String>) -> Self {
        self.cortex_ids = vec![instance.into()];
        self
    }

    /// Returns `true` if this worker accepts the given data type.
    pub fn accepts(&self, data_type: &str) -> bool {
        self.data_type_list.iter().any(|t| t == data_type)
    }
}

/// Health of one instance.
///
/// A probe either yields a version (OK) or it does not (ERROR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    /// The instance answered its status endpoint with a version.
    #[serde(rename = "OK")]
    Ok,
    /// The instance failed, timed out or answered without a version.
    #[serde(rename = "ERROR")]
    Error,
}

impl HealthStatus {
    /// Derives a status from a version probe.
    pub fn from_version(version: Option<&str>) -> Self {
        if version.is_some() {
            Self::Ok
        } else {
            Self::Error
        }
    }

    /// Returns `true` for [`HealthStatus::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Status of one instance as reported to monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStatus {
    /// Instance name.
    pub name: String,
    /// Engine version, empty when the instance is unhealthy.
    pub version: String,
    /// Derived health.
    pub status: HealthStatus,
}

impl InstanceStatus {
    /// Builds a status from the outcome of a version probe.
    pub fn from_probe(name: impl Into<String>, version: Option<String>) -> Self {
        let status = HealthStatus::from_version(version.as_deref());
        Self {
            name: name.into(),
            version: version.unwrap_or_default(),
            status,
        }
    }
}

/// Combined status of every configured instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    /// `Ok` only when every instance is `Ok`.
    pub status: HealthStatus,
    /// When the probes finished.
    pub checked_at: DateTime<Utc>,
    /// Per-instance results, in registry order.
    pub instances: Vec<InstanceStatus>,
}

impl FleetReport {
    /// Aggregates per-instance statuses.
    pub fn from_statuses(instances: Vec<InstanceStatus>) -> Self {
        let status = if instances.iter().all(|i| i.status.is_ok()) {
            HealthStatus::Ok
        } else {
            HealthStatus::Error
        };
        Self {
            status,
            checked_at: Utc::now(),
            instances,
        }
    }

    /// Returns the instances currently reporting `Error`.
    pub fn unhealthy(&self) -> impl Iterator<Item = &InstanceStatus> {
        self.instances.iter().filter(|i| !i.status.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_worker_deserialize_keeps_unknown_fields() {
        let worker: Worker = serde_json::from_value(json!({
            "id": "a1",
            "name": "MaxMind_GeoIP_3_0",
            "version": "3.0",
            "dataTypeList": ["ip"],
            "rate": 1000
        }))
        .unwrap();

        assert_eq!(worker.name, "MaxMind_GeoIP_3_0");
        assert!(worker.accepts("ip"));
        assert!(worker.cortex_ids.is_empty());
        assert_eq!(worker.extra.get("rate"), Some(&json!(1000)));
    }

    #[test]
    fn test_with_cortex_id_replaces_origin() {
        let mut worker = Worker::new("a1", "Abuse_Finder");
        worker.cortex_ids = vec!["old".into(), "older".into()];
        let worker = worker.with_cortex_id("local");
        assert_eq!(worker.cortex_ids, vec!["local".to_string()]);

        let value = serde_json::to_value(&worker).unwrap();
        assert_eq!(value["cortexIds"], json!(["local"]));
    }

    #[test]
    fn test_instance_status_from_probe() {
        let ok = InstanceStatus::from_probe("a", Some("3.1.7".into()));
        assert_eq!(ok.status, HealthStatus::Ok);
        assert_eq!(ok.version, "3.1.7");

        let err = InstanceStatus::from_probe("b", None);
        assert_eq!(err.status, HealthStatus::Error);
        assert_eq!(err.version, "");

        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"name": "b", "version": "", "status": "ERROR"})
        );
    }

    #[test]
    fn test_fleet_report_aggregation() {
        let report = FleetReport::from_statuses(vec![
            InstanceStatus::from_probe("a", Some("3.1.7".into())),
            InstanceStatus::from_probe("b", None),
        ]);
        assert_eq!(report.status, HealthStatus::Error);
        assert_eq!(report.unhealthy().count(), 1);

        let empty = FleetReport::from_statuses(Vec::new());
        assert_eq!(empty.status, HealthStatus::Ok);
    }
}
