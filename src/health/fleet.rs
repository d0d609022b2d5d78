//! Fleet-wide health aggregation.

use crate::client::CortexClient;
use crate::core::{FleetReport, HealthStatus};

use futures::future::join_all;
use std::sync::Arc;

/// Probes every client concurrently and combines the results.
///
/// Each probe is bounded on its own, so the whole call takes about one
/// probe timeout however many instances are configured.
pub async fn fleet_status(clients: &[Arc<CortexClient>]) -> FleetReport {
    let statuses = join_all(clients.iter().map(|client| client.status())).await;
    let report = FleetReport::from_statuses(statuses);

    tracing::info!(
        status = %report.status,
        instance_count = report.instances.len(),
        unhealthy = report.unhealthy().count(),
        "Cortex fleet status checked"
    );

    report
}

/// `Ok` only when every client reports `Ok`.
///
/// An empty fleet is `Ok`.
pub async fn fleet_health(clients: &[Arc<CortexClient>]) -> HealthStatus {
    let healths = join_all(clients.iter().map(|client| client.health())).await;
    if healths.iter().all(HealthStatus::is_ok) {
        HealthStatus::Ok
    } else {
        HealthStatus::Error
    }
}
