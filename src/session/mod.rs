//! Wallet session state container.
//!
//! # States
//! - Disconnected: no wallet, no account, no chain
//! - Connecting: one connect request in flight (transient)
//! - Connected: account and chain known
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting: connect()
//! Connecting → Connected: provider returned accounts + chain
//! Connecting → Disconnected: provider absent, rejected, or timed out
//! Connected → Disconnected: disconnect(), or provider reports zero accounts
//! Connected → Connected: account or chain change event
//! ```
//!
//! # Design Decisions
//! - Provider notifications are consumed sequentially by one pump; the
//!   session exposes resulting snapshots, not raw events
//! - A connect during an in-flight connect is suppressed, not an error
//! - Chain changes bump an epoch instead of forcing a reload

pub mod session;
pub mod state;
pub mod types;

pub use session::WalletSession;
pub use state::{ConnectionState, SessionSnapshot};
pub use types::{SessionError, SessionResult};
