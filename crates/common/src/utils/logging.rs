use std::io;

use tracing_subscriber::{fmt, EnvFilter};

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Compact stdout logging. `RUST_LOG` wins when set; otherwise the HTTP
/// layers log at info. Writes to stdout so container setups that hide
/// stderr still show logs.
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(filter_or("info,tower_http=info,axum=info"))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// JSON variant for structured log collection; the business layer defaults
/// to debug so enrollment and email dispatch stay visible.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(filter_or("info,service=debug"))
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}
