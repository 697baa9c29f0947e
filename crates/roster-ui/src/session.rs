use std::sync::{Mutex, PoisonError};

use roster_client::{UserApiClient, validation::validate_name};

use crate::{
    error::{FETCH_ERROR_MESSAGE, FetchError, SubmitError},
    state::SessionState,
    view::View,
};

/// Result of a [`UserSession::fetch_users`] call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced with `count` users.
    Applied { count: usize },
    /// A newer fetch was issued while this one was in flight; its result was dropped.
    Superseded,
}

/// Result of a [`UserSession::handle_submit`] call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank draft, nothing was sent.
    Ignored,
    /// The user was created and the list refetched.
    Created,
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    /// Token of the most recently issued fetch
    latest_fetch: u64,
}

/// One mounted user-management view.
///
/// Operations take `&self` so a submit can run while a fetch is still
/// outstanding. Every fetch gets a token; only the newest token may write the
/// list, the error or the loading flag, so a slow stale response can never
/// overwrite a newer one.
#[derive(Debug)]
pub struct UserSession {
    client: UserApiClient,
    inner: Mutex<Inner>,
}

impl UserSession {
    /// Create a session in its initial state without touching the network.
    pub fn new(client: UserApiClient) -> Self {
        Self {
            client,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Create a session and run the initial fetch.
    ///
    /// A failed initial fetch is reflected in the state, not returned.
    pub async fn mount(client: UserApiClient) -> Self {
        let session = Self::new(client);

        if let Err(err) = session.fetch_users().await {
            tracing::debug!(error = %err, "Initial user fetch failed");
        }

        session
    }

    /// Replace the user list with a fresh copy from the server.
    pub async fn fetch_users(&self) -> Result<FetchOutcome, FetchError> {
        let token = self.with_inner(|inner| {
            inner.latest_fetch += 1;
            inner.state.loading = true;
            inner.state.error = None;
            inner.latest_fetch
        });
        let _loading = LoadingGuard {
            session: self,
            token,
        };

        let result = self.client.list_users().await;

        self.with_inner(|inner| {
            if inner.latest_fetch != token {
                tracing::debug!(
                    token,
                    latest = inner.latest_fetch,
                    ok = result.is_ok(),
                    "Discarding superseded user list"
                );
                return Ok(FetchOutcome::Superseded);
            }

            match result {
                Ok(users) => {
                    let count = users.len();
                    inner.state.users = users;
                    Ok(FetchOutcome::Applied { count })
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        url = self.client.users_url(),
                        "Failed to load users"
                    );
                    inner.state.error = Some(FETCH_ERROR_MESSAGE.to_string());
                    Err(FetchError(err))
                }
            }
        })
    }

    /// Manual refresh action.
    pub async fn refresh(&self) -> Result<FetchOutcome, FetchError> {
        self.fetch_users().await
    }

    /// Create a user from `draft_name`, then refetch the list.
    ///
    /// A blank draft is silently ignored. The loading flag is not touched by
    /// the create itself; only the follow-up fetch sets it.
    pub async fn handle_submit(&self, draft_name: &str) -> Result<SubmitOutcome, SubmitError> {
        let Ok(name) = validate_name(draft_name) else {
            return Ok(SubmitOutcome::Ignored);
        };

        if let Err(err) = self.client.create_user(name).await {
            let err = SubmitError(err);
            tracing::warn!(error = %err, "Failed to add user");
            let message = err.user_message();
            self.with_inner(|inner| inner.state.error = Some(message));
            return Err(err);
        }

        tracing::info!(name, "User added");
        self.with_inner(|inner| inner.state.draft_name.clear());

        // A failed refetch is already recorded in the state.
        if let Err(err) = self.fetch_users().await {
            tracing::debug!(error = %err, "Refetch after submit failed");
        }

        Ok(SubmitOutcome::Created)
    }

    /// Update the contents of the name input.
    pub fn set_draft(&self, draft_name: impl Into<String>) {
        let draft_name = draft_name.into();
        self.with_inner(|inner| inner.state.draft_name = draft_name);
    }

    /// Submit whatever is currently in the name input.
    pub async fn submit_draft(&self) -> Result<SubmitOutcome, SubmitError> {
        let draft = self.with_inner(|inner| inner.state.draft_name.clone());
        self.handle_submit(&draft).await
    }

    pub fn snapshot(&self) -> SessionState {
        self.with_inner(|inner| inner.state.clone())
    }

    pub fn view(&self) -> View {
        self.with_inner(|inner| View::from_state(&inner.state))
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }
}

/// Clears `loading` when a fetch ends, including when its future is dropped
/// before completion, unless a newer fetch has taken over.
struct LoadingGuard<'a> {
    session: &'a UserSession,
    token: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let token = self.token;
        self.session.with_inner(|inner| {
            if inner.latest_fetch == token {
                inner.state.loading = false;
            }
        });
    }
}
