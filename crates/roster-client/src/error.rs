use reqwest::StatusCode;
use thiserror::Error;

/// Why a call against the users API failed.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("users API is unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("users API responded with {status}")]
    Status { status: StatusCode, body: String },
    #[error("could not read users API response body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("could not decode users API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid user name: {0}")]
    InvalidName(String),
    #[error("could not build request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Status code of a non-2xx response, if that is what happened.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
