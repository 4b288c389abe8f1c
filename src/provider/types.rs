//! Provider-facing types, events, and error definitions.

use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::mpsc;

pub use alloy::primitives::Address;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Parse a chain ID from the hex form used by `chainChanged`
    /// notifications (EIP-695), e.g. `"0xaa36a7"` for Sepolia (11155111).
    ///
    /// The `0x` prefix is optional; the digits are always read as hex.
    pub fn from_hex_str(s: &str) -> ProviderResult<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| ProviderError::Rpc(format!("invalid chain id '{}': {}", s, e)))
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification pushed by the wallet provider to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// The set of accounts exposed to the session changed. An empty list
    /// means the provider no longer exposes any account.
    AccountsChanged(Vec<Address>),
    /// The provider is now targeting a different chain.
    ChainChanged(ChainId),
}

/// Errors that can occur when talking to the wallet provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No provider is reachable (no endpoints configured, nothing injected).
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The user declined the request (EIP-1193 code 4001).
    #[error("user rejected the request: {0}")]
    UserRejected(String),

    /// The target chain is not registered with the provider (EIP-3326
    /// code 4902). Callers may offer to add the network.
    #[error("chain {0} is not registered with the provider")]
    UnknownChain(ChainId),

    /// The provider did not answer within the configured deadline.
    #[error("provider request timed out after {0} seconds")]
    Timeout(u64),

    /// Any other provider failure, message attached verbatim.
    #[error("provider error: {0}")]
    Rpc(String),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Fan-out list of event subscribers.
///
/// Every subscriber receives every event emitted after it subscribed.
/// Closed subscribers are dropped on the next emit.
#[derive(Default)]
pub(crate) struct EventFanout {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
}

impl EventFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("event fanout mutex poisoned")
            .push(tx);
        rx
    }

    pub fn emit(&self, event: ProviderEvent) {
        self.subscribers
            .lock()
            .expect("event fanout mutex poisoned")
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
