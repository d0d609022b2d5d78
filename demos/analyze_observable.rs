//! Submit an observable to an analyzer and wait for its report.
//!
//! Run with:
//! cargo run --example analyze_observable -- http://127.0.0.1:9001 API_KEY Abuse_Finder_3_0 domain example.org

use cortexbridge::prelude::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [url, key, analyzer, data_type, data] = args.as_slice() else {
        eprintln!("usage: analyze_observable <url> <api-key> <analyzer> <data-type> <data>");
        std::process::exit(2);
    };

    let instance =
        CortexInstance::new("cli", url.as_str()).with_auth(Authentication::bearer(key.as_str()));
    let cortex = CortexClient::with_default_transport(instance)?;

    // Accepts either an analyzer id or, on older engines, its name.
    let analyzer = match cortex.get_analyzer(analyzer).await {
        Ok(analyzer) => analyzer,
        Err(e) if e.is_not_found() => {
            eprintln!("Analyzer {analyzer} is not enabled on {url}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    if !analyzer.accepts(data_type) {
        eprintln!("Analyzer {} does not accept {data_type}", analyzer.name);
        std::process::exit(1);
    }

    let artifact = DataArtifact::new(data_type.as_str(), data.as_str())
        .with_tlp(2)
        .with_message("submitted from cortexbridge");
    let job = cortex.analyze(&analyzer.id, &artifact.into()).await?;
    let job_id = job["id"].as_str().unwrap_or_default();
    println!("Job {job_id} submitted to {}", analyzer.name);

    let report = cortex.wait_report(job_id, Duration::from_secs(60)).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
