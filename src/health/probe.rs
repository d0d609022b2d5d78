//! Bounded version probes.

use crate::core::Result;

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on a single version probe.
pub const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs a version probe with the fixed [`VERSION_PROBE_TIMEOUT`].
///
/// See [`probe_version_within`].
pub async fn probe_version<F>(instance: &str, probe: F) -> Option<String>
where
    F: Future<Output = Result<Option<String>>>,
{
    probe_version_within(instance, VERSION_PROBE_TIMEOUT, probe).await
}

/// Runs a version probe, turning every failure into `None`.
///
/// Errors and probes still running after `timeout` both yield `None`, so a
/// caller waits at most `timeout` and never sees an error.
pub async fn probe_version_within<F>(instance: &str, timeout: Duration, probe: F) -> Option<String>
where
    F: Future<Output = Result<Option<String>>>,
{
    match tokio::time::timeout(timeout, probe).await {
        Ok(Ok(Some(version))) => Some(version),
        Ok(Ok(None)) => {
            debug!(instance, "Status endpoint answered without a version");
            None
        }
        Ok(Err(error)) => {
            warn!(instance, error = %error, "Version probe failed");
            None
        }
        Err(_) => {
            warn!(
                instance,
                timeout_ms = timeout.as_millis() as u64,
                "Version probe timed out"
            );
            None
        }
    }
}
