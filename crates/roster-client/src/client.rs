use std::time::Duration;

use crate::{
    error::ApiError,
    model::{CreateUserRequest, User},
    validation::validate_name,
};

/// Client for `GET /users` and `POST /users`.
///
/// The base URL is whatever prefix the users collection lives under, e.g.
/// `http://localhost:8080` or a proxy path such as `http://localhost:5173/api`.
#[derive(Debug, Clone)]
pub struct UserApiClient {
    http: reqwest::Client,
    users_url: String,
}

impl UserApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            users_url: users_url(base_url),
        }
    }

    pub fn users_url(&self) -> &str {
        &self.users_url
    }

    /// Fetch the full user list in server order.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self
            .http
            .get(&self.users_url)
            .send()
            .await
            .map_err(send_error)?;

        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(ApiError::Body)?;
        let users: Vec<User> = serde_json::from_slice(&bytes)?;

        tracing::debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    /// Create a user. The name is trimmed and must not be blank.
    ///
    /// Only the status is inspected; the response body is dropped unread and
    /// callers refetch the list to learn the assigned id.
    pub async fn create_user(&self, name: &str) -> Result<(), ApiError> {
        let request = CreateUserRequest::new(validate_name(name)?);

        let response = self
            .http
            .post(&self.users_url)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let status = check_status(response).await?.status();

        tracing::debug!(%status, "Created user");
        Ok(())
    }
}

/// URL of the users collection under `base_url`.
pub fn users_url(base_url: &str) -> String {
    format!("{}/users", base_url.trim_end_matches('/'))
}

fn send_error(err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::Request(err)
    } else {
        ApiError::Unreachable(err)
    }
}

/// Pass 2xx responses through untouched; anything else becomes
/// [`ApiError::Status`] carrying whatever body could be read.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}
