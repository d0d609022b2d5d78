//! # Cortexbridge
//!
//! A resilient client for one or more instances of the Cortex
//! observable-analysis engine.
//!
//! ## Overview
//!
//! Cortexbridge is a stateless façade over remote Cortex instances,
//! allowing you to:
//!
//! - Resolve analyzers and responders by id or by name
//! - Submit observables or files for analysis and wait for reports
//! - Run responders on observables
//! - Probe the version and health of every configured instance without
//!   ever blocking a monitoring loop on a bad one
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cortexbridge::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = InstanceRegistry::load(Some("config/cortex.toml"))?;
//!     let cortex = registry.get("local").expect("instance configured");
//!
//!     let analyzer = cortex.get_analyzer("MaxMind_GeoIP_3_0").await?;
//!     let artifact = DataArtifact::new("ip", "8.8.8.8").with_tlp(2);
//!     let job = cortex.analyze(&analyzer.id, &artifact.into()).await?;
//!
//!     let job_id = job["id"].as_str().unwrap_or_default();
//!     let report = cortex.wait_report(job_id, Duration::from_secs(60)).await?;
//!     println!("{report}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Core**: Authentication, errors, artifacts and result types
//! - **Client**: Operations against a single instance
//! - **Registry**: Instances discovered from configuration
//! - **Health**: Bounded version probes and fleet aggregation
//!
//! Lookup and submission calls return explicit errors. Version, status and
//! health calls never fail: every failure, including a probe running past
//! one second, is reported as an `ERROR` status.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod client;
pub mod core;
pub mod health;
pub mod registry;

// Re-export commonly used types at the crate root
pub use crate::core::{
    Analyzer, Artifact, Authentication, ClientError, CortexError, DataArtifact, FileArtifact,
    FleetReport, HealthStatus, InstanceStatus, Result, Worker,
};

pub use crate::client::{CortexClient, CortexInstance, TransportSettings};
pub use crate::registry::{InstanceRegistry, InstanceRegistryBuilder};

/// Prelude module for convenient imports.
///
/// ```rust
/// use cortexbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::{CortexClient, CortexInstance, TransportSettings};
    pub use crate::core::{
        Analyzer, Artifact, Authentication, ClientError, CortexError, DataArtifact, FileArtifact,
        FleetReport, HealthStatus, InstanceStatus, Worker,
    };
    pub use crate::registry::InstanceRegistry;
}
