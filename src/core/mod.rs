//! Core types for the cortexbridge library.
//!
//! - [`auth`] - Request authentication strategies
//! - [`error`] - Structured error types
//! - [`artifact`] - Payloads submitted for analysis
//! - [`types`] - Worker descriptors and health types

pub mod artifact;
pub mod auth;
pub mod error;
pub mod types;

pub use artifact::{Artifact, DataArtifact, FileArtifact, FileSource};
pub use auth::Authentication;
pub use error::{ClientError, CortexError, Result};
pub use types::{Analyzer, FleetReport, HealthStatus, InstanceStatus, Worker};
