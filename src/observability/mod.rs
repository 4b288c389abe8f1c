//! Observability subsystem.
//!
//! Session transitions, provider failures, and pump lifecycle all emit
//! structured `tracing` events; this module holds the subscriber setup.

pub mod logging;

pub use logging::init_logging;
