//! Diagnostic logging setup.
//!
//! The library only emits `tracing` events (malformed messages, row rebuilds,
//! paging). Hosts install a subscriber; [`init_logging`] is the default one
//! used by the demo binary.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "chat_list=info";

/// Install a formatted stderr subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
