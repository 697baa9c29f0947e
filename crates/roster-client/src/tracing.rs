//! Logging setup shared by the console and the load generator.
//!
//! Both binaries draw on stdout (the user list, the run report), so every
//! subscriber here writes to stderr.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Initialize tracing based on the environment
///
/// # Development Mode
/// - Pretty-printed, human-readable logs with file locations
/// - Default level: DEBUG for our crates, INFO for the HTTP stack
///
/// # Production Mode
/// - JSON lines with the current span flattened into each event
/// - Default level: INFO, WARN for the HTTP stack
///
/// # Environment Variables
/// - `RUST_LOG`: Override default log level (e.g., `RUST_LOG=debug,reqwest=trace`)
pub fn init_tracing(env: &Environment) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(env)));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                layer
                    .with_line_number(true)
                    .with_file(true)
                    .pretty()
                    .with_filter(env_filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                layer
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .flatten_event(true)
                    .with_filter(env_filter),
            )
            .init();
    }

    tracing::info!(environment = ?env, "Tracing initialized");
}

/// Filter used when `RUST_LOG` is unset.
///
/// hyper and reqwest log every connection at debug, which drowns out the
/// per-request events of a load run.
const fn default_directives(env: &Environment) -> &'static str {
    match env {
        Environment::Development => "debug,hyper=info,hyper_util=info,reqwest=info",
        Environment::Production => "info,hyper=warn,hyper_util=warn,reqwest=warn",
    }
}
