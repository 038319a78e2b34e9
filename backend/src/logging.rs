//! Log setup for hosts embedding the backend.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to `default_filter`, then to `info`
fn build_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global `tracing` subscriber.
///
/// Returns false when a subscriber was already installed, in which case the
/// existing one is kept.
pub fn init_logging(default_filter: &str) -> bool {
    fmt()
        .with_env_filter(build_filter(default_filter))
        .with_target(true)
        .try_init()
        .is_ok()
}
