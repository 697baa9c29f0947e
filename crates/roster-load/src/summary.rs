use std::fmt;

use crate::{
    stats::{RunMetrics, Trend},
    threshold::Threshold,
};

/// Outcome of one threshold at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdResult {
    pub threshold: Threshold,
    pub observed: f64,
    pub passed: bool,
}

/// End-of-run report.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub metrics: RunMetrics,
    pub thresholds: Vec<ThresholdResult>,
}

impl RunSummary {
    pub fn new(metrics: RunMetrics, thresholds: &[Threshold]) -> Self {
        let thresholds = thresholds
            .iter()
            .map(|threshold| {
                let observed = threshold.observed(&metrics);
                ThresholdResult {
                    threshold: threshold.clone(),
                    observed,
                    passed: threshold.passes(observed),
                }
            })
            .collect();

        Self {
            metrics,
            thresholds,
        }
    }

    /// The run passes when every threshold holds. Checks do not count.
    pub fn passed(&self) -> bool {
        self.thresholds.iter().all(|result| result.passed)
    }

    pub fn failed_thresholds(&self) -> impl Iterator<Item = &ThresholdResult> {
        self.thresholds.iter().filter(|result| !result.passed)
    }
}

fn write_trend(f: &mut fmt::Formatter<'_>, label: &str, trend: &Trend) -> fmt::Result {
    writeln!(
        f,
        "{label:<20} avg={:.2}ms min={:.2}ms med={:.2}ms max={:.2}ms p(90)={:.2}ms p(95)={:.2}ms",
        trend.avg(),
        trend.min(),
        trend.med(),
        trend.max(),
        trend.percentile(90.0),
        trend.percentile(95.0),
    )
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;

        writeln!(f, "\n========== Load Test Results ==========")?;
        writeln!(f, "Duration:            {:.2}s", m.elapsed.as_secs_f64())?;
        writeln!(
            f,
            "Requests:            {} ({:.2}/s)",
            m.http_reqs(),
            m.http_reqs_per_sec()
        )?;
        writeln!(
            f,
            "Failed requests:     {:.2}% ({} of {})",
            m.http_req_failed.value() * 100.0,
            m.http_req_failed.hits,
            m.http_req_failed.total
        )?;
        writeln!(
            f,
            "Iterations:          {} ({:.2}/s)",
            m.iterations,
            m.iterations_per_sec()
        )?;

        writeln!(f, "\nLatency:")?;
        write_trend(f, "  http_req_duration", &m.http_req_duration)?;
        write_trend(f, "  iteration_duration", &m.iteration_duration)?;

        writeln!(f, "\nChecks:              {:.2}%", m.checks.value() * 100.0)?;
        for tally in &m.check_tallies {
            let mark = if tally.fails == 0 { "ok  " } else { "FAIL" };
            writeln!(
                f,
                "  {mark} {} ({} passed, {} failed)",
                tally.name, tally.passes, tally.fails
            )?;
        }

        writeln!(f, "\nThresholds:")?;
        for result in &self.thresholds {
            let mark = if result.passed { "ok  " } else { "FAIL" };
            writeln!(
                f,
                "  {mark} {} (observed {:.4})",
                result.threshold, result.observed
            )?;
        }

        let verdict = if self.passed() { "PASSED" } else { "FAILED" };
        writeln!(f, "\nResult:              {verdict}")?;
        writeln!(f, "=======================================")
    }
}
