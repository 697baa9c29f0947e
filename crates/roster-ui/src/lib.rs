//! User list synchronization for the roster front end.
//!
//! A [`UserSession`] owns the state of one rendered user-management view:
//! the last known user list, the draft name in the form, and the transient
//! loading and error flags. The list is never patched locally; every
//! successful create is followed by a full refetch.

pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod view;

pub use config::ConsoleConfig;
pub use error::{FetchError, SubmitError};
pub use session::{FetchOutcome, SubmitOutcome, UserSession};
pub use state::SessionState;
pub use view::{ListArea, View};
