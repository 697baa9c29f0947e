//! Pass/fail conditions over run-wide aggregates.
//!
//! Expressions use the familiar `<aggregate> <op> <value>` form, for example
//! `rate<0.01` on `http_req_failed` or `p(95)<300` on `http_req_duration`.
//! Durations are in milliseconds.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::stats::RunMetrics;

static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(rate|count|avg|min|max|med|p\(\s*(\d+(?:\.\d+)?)\s*\))",
        r"\s*(<=|>=|==|!=|<|>)",
        r"\s*(-?\d+(?:\.\d+)?)\s*$",
    ))
    .expect("threshold expression regex is valid")
});

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
    #[error("invalid threshold expression '{0}'")]
    InvalidExpression(String),
    #[error("percentile must be between 0 and 100, got {0}")]
    InvalidPercentile(String),
    #[error("aggregate '{aggregate}' is not available for {kind} metric '{metric}'")]
    UnsupportedAggregate {
        metric: &'static str,
        kind: &'static str,
        aggregate: String,
    },
    #[error("threshold '{0}' must look like 'metric:expr[,expr]'")]
    MissingMetric(String),
}

/// How a metric aggregates its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Rate,
    Trend,
}

impl MetricKind {
    const fn name(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Rate => "rate",
            Self::Trend => "trend",
        }
    }
}

/// Metrics a threshold can be set on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    HttpReqs,
    HttpReqFailed,
    HttpReqDuration,
    Iterations,
    IterationDuration,
    Checks,
}

impl Metric {
    pub const fn name(self) -> &'static str {
        match self {
            Self::HttpReqs => "http_reqs",
            Self::HttpReqFailed => "http_req_failed",
            Self::HttpReqDuration => "http_req_duration",
            Self::Iterations => "iterations",
            Self::IterationDuration => "iteration_duration",
            Self::Checks => "checks",
        }
    }

    pub const fn kind(self) -> MetricKind {
        match self {
            Self::HttpReqs | Self::Iterations => MetricKind::Counter,
            Self::HttpReqFailed | Self::Checks => MetricKind::Rate,
            Self::HttpReqDuration | Self::IterationDuration => MetricKind::Trend,
        }
    }
}

impl FromStr for Metric {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "http_reqs" => Ok(Self::HttpReqs),
            "http_req_failed" => Ok(Self::HttpReqFailed),
            "http_req_duration" => Ok(Self::HttpReqDuration),
            "iterations" => Ok(Self::Iterations),
            "iteration_duration" => Ok(Self::IterationDuration),
            "checks" => Ok(Self::Checks),
            other => Err(ThresholdError::UnknownMetric(other.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregate {
    /// Rate metrics: fraction of hits. Counters: count per second.
    Rate,
    Count,
    Avg,
    Min,
    Max,
    Med,
    Percentile(f64),
}

impl Aggregate {
    const fn supports(self, kind: MetricKind) -> bool {
        match kind {
            MetricKind::Counter => matches!(self, Self::Count | Self::Rate),
            MetricKind::Rate => matches!(self, Self::Rate),
            MetricKind::Trend => matches!(
                self,
                Self::Avg | Self::Min | Self::Max | Self::Med | Self::Percentile(_)
            ),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rate => f.write_str("rate"),
            Self::Count => f.write_str("count"),
            Self::Avg => f.write_str("avg"),
            Self::Min => f.write_str("min"),
            Self::Max => f.write_str("max"),
            Self::Med => f.write_str("med"),
            Self::Percentile(p) => write!(f, "p({p})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    fn holds(self, observed: f64, limit: f64) -> bool {
        match self {
            Self::Lt => observed < limit,
            Self::Le => observed <= limit,
            Self::Gt => observed > limit,
            Self::Ge => observed >= limit,
            Self::Eq => observed == limit,
            Self::Ne => observed != limit,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// One condition that must hold over the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub metric: Metric,
    pub aggregate: Aggregate,
    pub comparison: Comparison,
    pub limit: f64,
}

impl Threshold {
    /// Parse one expression such as `p(95)<300` for `metric`.
    pub fn parse(metric: Metric, expression: &str) -> Result<Self, ThresholdError> {
        let captures = EXPRESSION
            .captures(expression)
            .ok_or_else(|| ThresholdError::InvalidExpression(expression.to_string()))?;

        let aggregate = match (&captures[1], captures.get(2)) {
            (_, Some(p)) => {
                let percentile: f64 = p
                    .as_str()
                    .parse()
                    .map_err(|_| ThresholdError::InvalidPercentile(p.as_str().to_string()))?;
                if !(0.0..=100.0).contains(&percentile) {
                    return Err(ThresholdError::InvalidPercentile(p.as_str().to_string()));
                }
                Aggregate::Percentile(percentile)
            }
            ("rate", None) => Aggregate::Rate,
            ("count", None) => Aggregate::Count,
            ("avg", None) => Aggregate::Avg,
            ("min", None) => Aggregate::Min,
            ("max", None) => Aggregate::Max,
            _ => Aggregate::Med,
        };

        if !aggregate.supports(metric.kind()) {
            return Err(ThresholdError::UnsupportedAggregate {
                metric: metric.name(),
                kind: metric.kind().name(),
                aggregate: aggregate.to_string(),
            });
        }

        let comparison = match &captures[3] {
            "<" => Comparison::Lt,
            "<=" => Comparison::Le,
            ">" => Comparison::Gt,
            ">=" => Comparison::Ge,
            "==" => Comparison::Eq,
            _ => Comparison::Ne,
        };

        let limit = captures[4]
            .parse()
            .map_err(|_| ThresholdError::InvalidExpression(expression.to_string()))?;

        Ok(Self {
            metric,
            aggregate,
            comparison,
            limit,
        })
    }

    /// The aggregate value this threshold compares against its limit.
    pub fn observed(&self, metrics: &RunMetrics) -> f64 {
        let trend = match self.metric {
            Metric::HttpReqDuration => &metrics.http_req_duration,
            Metric::IterationDuration => &metrics.iteration_duration,
            Metric::HttpReqFailed => return metrics.http_req_failed.value(),
            Metric::Checks => return metrics.checks.value(),
            Metric::HttpReqs => {
                return match self.aggregate {
                    Aggregate::Rate => metrics.http_reqs_per_sec(),
                    _ => metrics.http_reqs() as f64,
                };
            }
            Metric::Iterations => {
                return match self.aggregate {
                    Aggregate::Rate => metrics.iterations_per_sec(),
                    _ => metrics.iterations as f64,
                };
            }
        };

        match self.aggregate {
            Aggregate::Avg => trend.avg(),
            Aggregate::Min => trend.min(),
            Aggregate::Max => trend.max(),
            Aggregate::Percentile(p) => trend.percentile(p),
            Aggregate::Med | Aggregate::Rate | Aggregate::Count => trend.med(),
        }
    }

    pub fn passes(&self, observed: f64) -> bool {
        self.comparison.holds(observed, self.limit)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}{}{}",
            self.metric,
            self.aggregate,
            self.comparison.symbol(),
            self.limit
        )
    }
}

/// Parse a threshold list such as
/// `http_req_failed:rate<0.01;http_req_duration:p(95)<300,avg<200`.
pub fn parse_thresholds(list: &str) -> Result<Vec<Threshold>, ThresholdError> {
    let mut thresholds = Vec::new();

    for group in list.split(';').map(str::trim).filter(|g| !g.is_empty()) {
        let (metric, expressions) = group
            .split_once(':')
            .ok_or_else(|| ThresholdError::MissingMetric(group.to_string()))?;
        let metric: Metric = metric.parse()?;

        for expression in expressions.split(',') {
            thresholds.push(Threshold::parse(metric, expression)?);
        }
    }

    Ok(thresholds)
}

/// Failure rate under 1% and p95 latency under 300ms.
pub fn default_thresholds() -> Vec<Threshold> {
    vec![
        Threshold {
            metric: Metric::HttpReqFailed,
            aggregate: Aggregate::Rate,
            comparison: Comparison::Lt,
            limit: 0.01,
        },
        Threshold {
            metric: Metric::HttpReqDuration,
            aggregate: Aggregate::Percentile(95.0),
            comparison: Comparison::Lt,
            limit: 300.0,
        },
    ]
}
