//! Typed client for the users REST API shared by the console front end and
//! the load generator.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod tracing;
pub mod validation;

pub use client::UserApiClient;
pub use config::Environment;
pub use error::ApiError;
pub use model::{CreateUserRequest, User};
