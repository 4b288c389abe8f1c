//! Wallet provider capability.
//!
//! # Responsibilities
//! - Define the minimal surface a wallet provider exposes to a session:
//!   request accounts, report the current chain, switch chains, and push
//!   account/chain change notifications
//! - Ship an RPC-backed implementation for native use and a scriptable
//!   mock for tests and demos
//!
//! # Design Decisions
//! - The trait is object-safe so sessions hold `Arc<dyn WalletProvider>`
//!   and tests can substitute the mock freely
//! - Notifications are push-based: subscribers get an unbounded channel
//!   and the session consumes it sequentially

pub mod mock;
pub mod rpc;
pub mod types;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::provider::types::{Address, ChainId, ProviderEvent, ProviderResult};

/// The external wallet capability a session mediates access to.
///
/// Implementations must not retry internally; failures are surfaced to the
/// session, which leaves retry policy to its caller.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the provider for the accounts it exposes.
    ///
    /// May reject with [`types::ProviderError::UserRejected`] when the user
    /// declines the prompt.
    async fn request_accounts(&self) -> ProviderResult<Vec<Address>>;

    /// The chain the provider is currently targeting.
    async fn chain_id(&self) -> ProviderResult<ChainId>;

    /// Ask the provider to target a different chain.
    ///
    /// Rejects with [`types::ProviderError::UnknownChain`] when the target
    /// is not registered. On success the provider emits
    /// [`ProviderEvent::ChainChanged`] to all subscribers.
    async fn switch_chain(&self, target: ChainId) -> ProviderResult<()>;

    /// Subscribe to account and chain change notifications.
    ///
    /// Every subscriber sees every event emitted after it subscribed.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent>;
}
