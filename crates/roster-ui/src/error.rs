use roster_client::ApiError;
use thiserror::Error;

/// Shown when the user list cannot be loaded, whatever the cause.
pub const FETCH_ERROR_MESSAGE: &str = "could not load users, API may be down";

/// Loading the user list failed.
#[derive(Error, Debug)]
#[error("failed to load users: {0}")]
pub struct FetchError(#[source] pub ApiError);

/// Creating a user failed.
#[derive(Error, Debug)]
#[error("failed to add user: {0}")]
pub struct SubmitError(#[source] pub ApiError);

impl SubmitError {
    /// The message stored in the session for the user to read.
    pub fn user_message(&self) -> String {
        format!("could not add user: {}", self.0)
    }
}
