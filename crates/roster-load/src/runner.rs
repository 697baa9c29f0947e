use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    config::{ConfigError, WorkloadConfig},
    stats::RunMetrics,
    summary::RunSummary,
    workload::{Workload, pause_before},
};

/// Run the workload with `virtual_users` concurrent actors for `duration`.
///
/// No iteration starts after the deadline; one already running is allowed to
/// finish. Each virtual user keeps its own metrics and they are merged once
/// all of them are done.
pub async fn run_workload(config: &WorkloadConfig) -> Result<RunSummary, ConfigError> {
    let workload = Arc::new(Workload::new(config)?);

    tracing::info!(
        target_url = workload.users_url(),
        virtual_users = config.virtual_users,
        duration_secs = config.duration.as_secs_f64(),
        "Starting load run"
    );

    let start = Instant::now();
    let deadline = start + config.duration;
    let mut handles = Vec::with_capacity(config.virtual_users);

    for vu in 1..=config.virtual_users {
        let workload = Arc::clone(&workload);
        let pause = config.iteration_pause;

        handles.push(tokio::spawn(async move {
            run_virtual_user(vu, &workload, deadline, pause).await
        }));
    }

    let mut metrics = RunMetrics::default();
    for handle in handles {
        match handle.await {
            Ok(vu_metrics) => metrics.merge(vu_metrics),
            Err(err) => tracing::error!(error = %err, "Virtual user task failed"),
        }
    }
    metrics.elapsed = start.elapsed();

    let summary = RunSummary::new(metrics, &config.thresholds);

    tracing::info!(
        requests = summary.metrics.http_reqs(),
        iterations = summary.metrics.iterations,
        passed = summary.passed(),
        "Load run finished"
    );

    Ok(summary)
}

async fn run_virtual_user(
    vu: usize,
    workload: &Workload,
    deadline: Instant,
    pause: Duration,
) -> RunMetrics {
    let mut metrics = RunMetrics::default();

    while Instant::now() < deadline {
        let started = Instant::now();

        workload.run_iteration(&mut metrics).await;
        tokio::time::sleep(pause_before(deadline, pause)).await;

        let duration = started.elapsed();
        metrics.record_iteration(duration);
        crate::metrics::record_iteration(duration);
    }

    tracing::debug!(vu, iterations = metrics.iterations, "Virtual user finished");
    metrics
}
