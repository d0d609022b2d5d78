//! Health probing for Cortex instances.
//!
//! A version probe is the only health signal: an instance is `OK` when its
//! status endpoint returns a version within [`VERSION_PROBE_TIMEOUT`], and
//! `ERROR` otherwise. Probes never fail and never block past the timeout,
//! so monitoring loops can aggregate a whole fleet without stalling on one
//! bad instance.

mod fleet;
mod probe;

pub use fleet::{fleet_health, fleet_status};
pub use probe::{probe_version, probe_version_within, VERSION_PROBE_TIMEOUT};
