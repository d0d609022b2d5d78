//! Fleet status example: probe every configured Cortex instance.
//!
//! This example shows how to:
//! - Load instances from a configuration file and the environment
//! - Probe every instance with a bounded version check
//! - Print a per-instance status table
//!
//! Run with: cargo run --example fleet_status -- config/cortex.toml
//!
//! Without a file, instances come from the environment only, e.g.
//! `CORTEXBRIDGE__CORTEX__LOCAL__URL=http://127.0.0.1:9001`.

use cortexbridge::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args().nth(1);
    let registry = InstanceRegistry::load(path.as_deref())?;

    if registry.is_empty() {
        println!("No Cortex instance configured.");
        return Ok(());
    }

    let report = registry.status().await;

    println!("=== Cortex fleet: {} ===", report.status);
    println!("Checked at: {}", report.checked_at);
    for instance in &report.instances {
        let version = if instance.version.is_empty() {
            "-"
        } else {
            instance.version.as_str()
        };
        println!(
            "{:<20} {:<6} {}",
            instance.name,
            instance.status.to_string(),
            version
        );
    }

    Ok(())
}
