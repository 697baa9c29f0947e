use std::process::ExitCode;

use roster_load::{LoadConfig, metrics::init_metrics, run_workload};

/// Exit status of a run that completed but crossed a threshold.
const THRESHOLDS_FAILED: u8 = 99;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = LoadConfig::from_env()?;

    roster_client::tracing::init_tracing(&config.env);

    let workload = config.workload()?;

    let prometheus = match &config.prometheus_out {
        Some(_) => Some(init_metrics()?),
        None => None,
    };

    let summary = run_workload(&workload).await?;
    println!("{summary}");

    if let (Some(handle), Some(path)) = (prometheus, &config.prometheus_out) {
        std::fs::write(path, handle.render())?;
        tracing::info!(path = %path.display(), "Wrote Prometheus metrics");
    }

    if summary.passed() {
        return Ok(ExitCode::SUCCESS);
    }

    for result in summary.failed_thresholds() {
        tracing::error!(
            threshold = %result.threshold,
            observed = result.observed,
            "Threshold crossed"
        );
    }

    Ok(ExitCode::from(THRESHOLDS_FAILED))
}
