//! Client-side wallet session library.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ──connect/disconnect/switch──▶ ┌───────────────┐
//!                                         │ WalletSession │──snapshots──▶ watch subscribers
//!   provider ──accountsChanged/────────▶  │  (event pump) │
//!              chainChanged events        └───────┬───────┘
//!                                                 │
//!                                        ┌────────┴────────┐
//!                                        │ WalletProvider  │  RpcProvider (alloy HTTP)
//!                                        │   (trait)       │  MockProvider (scriptable)
//!                                        └─────────────────┘
//! ```
//!
//! A `WalletSession` tracks a single wallet connection: the account, the
//! chain it targets, and whether a connect is in flight. Provider push
//! notifications are consumed sequentially, and consumers observe state
//! through snapshots instead of raw events.

// Core subsystems
pub mod provider;
pub mod session;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::{load_config, SessionConfig};
pub use lifecycle::Shutdown;
pub use provider::types::{Address, ChainId, ProviderError, ProviderEvent};
pub use provider::WalletProvider;
pub use session::{ConnectionState, SessionError, SessionSnapshot, WalletSession};
