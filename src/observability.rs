//! Tracing subscriber setup for embedders.
//!
//! The library only emits `tracing` events. Hosts that have no subscriber of
//! their own can call [`init_tracing`] once at startup; the filter comes from
//! `COGNILENS_LOG` (same syntax as `RUST_LOG`) and defaults to `warn`.
//! Output goes to stderr so stdout stays free for protocol traffic.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "COGNILENS_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Build the filter from `COGNILENS_LOG`, falling back to `warn`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global fmt subscriber. Returns `false` if one was already set.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
