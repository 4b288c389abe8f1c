//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Respect `RUST_LOG` when set, falling back to the configured level
//!
//! All modules log through `tracing` with structured fields; this module
//! only wires up the subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_level` comes from the observability config (e.g., "info") and
/// is used when `RUST_LOG` is not set. Safe to call once; a second call
/// is a no-op because a global subscriber is already installed.
pub fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("wallet_session={}", default_level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
