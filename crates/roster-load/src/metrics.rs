//! Prometheus export of load run measurements.
//!
//! Recording goes through the `metrics` facade and is a no-op unless a
//! recorder was installed with [`init_metrics`].

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Histogram buckets for request durations, in seconds. 0.3 matches the
/// default p95 latency threshold.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.3, 0.5, 1.0, 2.5, 5.0, 10.0,
];

fn prometheus_builder() -> anyhow::Result<PrometheusBuilder> {
    Ok(PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("loadgen_http_req_duration_seconds".to_string()),
        DURATION_BUCKETS,
    )?)
}

/// Install a Prometheus recorder and return the handle used to render it.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = prometheus_builder()?.install_recorder()?;

    Ok(handle)
}

/// Record one request. `status` is `None` when no response arrived.
pub fn record_request(method: &'static str, status: Option<u16>, duration: Duration, failed: bool) {
    let status = status.map_or_else(|| "none".to_string(), |s| s.to_string());

    counter!(
        "loadgen_http_reqs_total",
        "method" => method,
        "status" => status.clone()
    )
    .increment(1);

    if failed {
        counter!("loadgen_http_req_failed_total", "method" => method).increment(1);
    }

    histogram!(
        "loadgen_http_req_duration_seconds",
        "method" => method,
        "status" => status
    )
    .record(duration.as_secs_f64());
}

pub fn record_check(name: &'static str, passed: bool) {
    let result = if passed { "pass" } else { "fail" };

    counter!("loadgen_checks_total", "check" => name, "result" => result).increment(1);
}

pub fn record_iteration(duration: Duration) {
    counter!("loadgen_iterations_total").increment(1);
    histogram!("loadgen_iteration_duration_seconds").record(duration.as_secs_f64());
}
