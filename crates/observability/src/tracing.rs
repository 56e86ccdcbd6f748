//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

/// Resolve the filter: explicit directive, then `RUST_LOG`, then `info`.
///
/// A directive that fails to parse falls back the same way.
pub fn filter(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the JSON subscriber. Later calls are ignored.
pub fn init(directive: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(directive))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
