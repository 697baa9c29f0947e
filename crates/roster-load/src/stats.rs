//! Per-run metric aggregation.
//!
//! Each virtual user fills its own [`RunMetrics`]; the runner merges them once
//! every virtual user has finished.

use std::time::Duration;

/// Fraction of samples that were "hits" (a failed request, a passed check).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rate {
    pub hits: u64,
    pub total: u64,
}

impl Rate {
    pub const fn add(&mut self, hit: bool) {
        self.total += 1;
        if hit {
            self.hits += 1;
        }
    }

    pub const fn merge(&mut self, other: Self) {
        self.hits += other.hits;
        self.total += other.total;
    }

    /// `hits / total`, or 0 with no samples.
    pub fn value(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.hits as f64 / self.total as f64
        }
    }
}

/// Raw samples of a time-like metric, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trend {
    values: Vec<f64>,
}

impl Trend {
    pub fn add(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn add_duration(&mut self, duration: Duration) {
        self.add(duration.as_secs_f64() * 1000.0);
    }

    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().reduce(f64::min).unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().reduce(f64::max).unwrap_or(0.0)
    }

    pub fn avg(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.values.iter().sum::<f64>() / self.values.len() as f64
        }
    }

    pub fn med(&self) -> f64 {
        self.percentile(50.0)
    }

    /// `p`-th percentile (0..=100), linearly interpolated between the two
    /// closest ranks. An empty trend reports 0.
    pub fn percentile(&self, p: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }

        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);

        let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let weight = rank - lower as f64;

        sorted[lower] + (sorted[upper] - sorted[lower]) * weight
    }
}

/// Pass/fail tally of one named check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTally {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

/// Everything measured during a run (or one virtual user's share of it).
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// One sample per request; a hit is a failed request
    pub http_req_failed: Rate,
    pub http_req_duration: Trend,
    pub iteration_duration: Trend,
    pub iterations: u64,
    /// One sample per check evaluation; a hit is a pass
    pub checks: Rate,
    /// Per-check tallies in first-seen order
    pub check_tallies: Vec<CheckTally>,
    /// Wall time of the run, set by the runner
    pub elapsed: Duration,
}

impl RunMetrics {
    pub fn record_request(&mut self, duration: Duration, failed: bool) {
        self.http_req_failed.add(failed);
        self.http_req_duration.add_duration(duration);
    }

    pub fn record_check(&mut self, name: &str, passed: bool) {
        self.checks.add(passed);

        let tally = match self.check_tallies.iter_mut().position(|t| t.name == name) {
            Some(index) => &mut self.check_tallies[index],
            None => {
                self.check_tallies.push(CheckTally {
                    name: name.to_string(),
                    passes: 0,
                    fails: 0,
                });
                let last = self.check_tallies.len() - 1;
                &mut self.check_tallies[last]
            }
        };

        if passed {
            tally.passes += 1;
        } else {
            tally.fails += 1;
        }
    }

    pub fn record_iteration(&mut self, duration: Duration) {
        self.iterations += 1;
        self.iteration_duration.add_duration(duration);
    }

    pub fn http_reqs(&self) -> u64 {
        self.http_req_failed.total
    }

    /// Requests per second over the run.
    pub fn http_reqs_per_sec(&self) -> f64 {
        per_second(self.http_reqs(), self.elapsed)
    }

    pub fn iterations_per_sec(&self) -> f64 {
        per_second(self.iterations, self.elapsed)
    }

    pub fn merge(&mut self, other: Self) {
        self.http_req_failed.merge(other.http_req_failed);
        self.http_req_duration.merge(other.http_req_duration);
        self.iteration_duration.merge(other.iteration_duration);
        self.iterations += other.iterations;
        self.checks.merge(other.checks);

        for tally in other.check_tallies {
            match self.check_tallies.iter_mut().find(|t| t.name == tally.name) {
                Some(existing) => {
                    existing.passes += tally.passes;
                    existing.fails += tally.fails;
                }
                None => self.check_tallies.push(tally),
            }
        }

        self.elapsed = self.elapsed.max(other.elapsed);
    }
}

fn per_second(count: u64, elapsed: Duration) -> f64 {
    if elapsed.is_zero() {
        0.0
    } else {
        count as f64 / elapsed.as_secs_f64()
    }
}
