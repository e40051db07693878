//! Process-wide tracing setup shared by every binary and test harness.
//!
//! The pipeline crates only emit events through `tracing`; which subscriber
//! (if any) consumes them is decided exactly once, here.

use tracing_subscriber::EnvFilter;

/// Install the JSON subscriber with an env-driven filter.
///
/// Safe to call multiple times; after the first call the rest are no-ops,
/// which matters for integration tests that each try to initialize.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Plain, human-readable output for local debugging.
///
/// Same idempotence rules as [`init`]; whichever of the two runs first wins.
pub fn init_pretty() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
