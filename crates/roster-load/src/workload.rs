//! One iteration of the workload: create a user, then list users.

use std::time::{Duration, Instant};

use reqwest::{RequestBuilder, StatusCode, header::CONTENT_TYPE};
use roster_client::{CreateUserRequest, client::users_url};

use crate::{
    config::{ConfigError, WorkloadConfig},
    stats::RunMetrics,
};

pub const CHECK_POST_CREATED: &str = "POST status is 201";
pub const CHECK_GET_OK: &str = "GET status is 200";
pub const CHECK_GET_HAS_USERS: &str = "GET returned users";

/// Shared by all virtual users of a run.
#[derive(Debug)]
pub struct Workload {
    http: reqwest::Client,
    users_url: String,
    payload: Vec<u8>,
}

/// What came back for one request, if anything.
struct Reply {
    status: StatusCode,
    body: Vec<u8>,
}

impl Workload {
    pub fn new(config: &WorkloadConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let payload = serde_json::to_vec(&CreateUserRequest::new(config.payload_name.clone()))?;

        Ok(Self {
            http,
            users_url: users_url(&config.target_url),
            payload,
        })
    }

    pub fn users_url(&self) -> &str {
        &self.users_url
    }

    /// Run the write then the read. Check failures are counted, never raised.
    pub async fn run_iteration(&self, metrics: &mut RunMetrics) {
        let post = self
            .http
            .post(&self.users_url)
            .header(CONTENT_TYPE, "application/json")
            .body(self.payload.clone());
        let reply = self.send("POST", post, metrics).await;

        check(
            metrics,
            CHECK_POST_CREATED,
            reply.as_ref().is_some_and(|r| r.status == StatusCode::CREATED),
        );

        let reply = self.send("GET", self.http.get(&self.users_url), metrics).await;

        check(
            metrics,
            CHECK_GET_OK,
            reply.as_ref().is_some_and(|r| r.status == StatusCode::OK),
        );
        check(
            metrics,
            CHECK_GET_HAS_USERS,
            reply.as_ref().is_some_and(|r| has_users(&r.body)),
        );
    }

    async fn send(
        &self,
        method: &'static str,
        request: RequestBuilder,
        metrics: &mut RunMetrics,
    ) -> Option<Reply> {
        let start = Instant::now();
        let result = receive(request).await;
        let duration = start.elapsed();

        let (status, failed) = match &result {
            Ok(reply) => (Some(reply.status), is_failure(reply.status)),
            Err(err) => {
                tracing::debug!(method, error = %err, "Request failed");
                (None, true)
            }
        };

        metrics.record_request(duration, failed);
        crate::metrics::record_request(method, status.map(|s| s.as_u16()), duration, failed);

        result.ok()
    }
}

async fn receive(request: RequestBuilder) -> Result<Reply, reqwest::Error> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();
    Ok(Reply { status, body })
}

/// Statuses outside 200..=399 count as failed requests.
fn is_failure(status: StatusCode) -> bool {
    !(status.is_success() || status.is_redirection())
}

/// The body is a JSON array with at least one element.
fn has_users(body: &[u8]) -> bool {
    serde_json::from_slice::<Vec<serde_json::Value>>(body).is_ok_and(|users| !users.is_empty())
}

fn check(metrics: &mut RunMetrics, name: &'static str, passed: bool) {
    if !passed {
        tracing::debug!(check = name, "Check failed");
    }
    metrics.record_check(name, passed);
    crate::metrics::record_check(name, passed);
}

/// Time left until `deadline`, capped at `pause`.
pub(crate) fn pause_before(deadline: Instant, pause: Duration) -> Duration {
    deadline.saturating_duration_since(Instant::now()).min(pause)
}
