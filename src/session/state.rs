//! Session state and observable snapshots.

use serde::Serialize;

use crate::provider::types::{Address, ChainId};

/// Connection state of a wallet session.
///
/// The chain id lives inside `Connected`, so it exists exactly when an
/// account does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionState {
    /// No wallet connected.
    #[default]
    Disconnected,
    /// A connect request is in flight. Transient: always resolves to
    /// `Connected` or `Disconnected`.
    Connecting,
    /// A wallet is connected.
    Connected { account: Address, chain_id: ChainId },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }
}

/// Point-in-time view of a session, published on every state change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: ConnectionState,

    /// Message from the most recent failed operation, cleared on the next
    /// successful connect or on disconnect.
    pub last_error: Option<String>,

    /// Bumped on every chain change while connected. Consumers holding
    /// chain-bound handles (contract bindings, RPC clients) rebuild them
    /// when the epoch moves.
    pub epoch: u64,
}

impl SessionSnapshot {
    /// Connected account, if any.
    pub fn account(&self) -> Option<Address> {
        match &self.state {
            ConnectionState::Connected { account, .. } => Some(*account),
            _ => None,
        }
    }

    /// Chain of the connected account, if any.
    pub fn chain_id(&self) -> Option<ChainId> {
        match &self.state {
            ConnectionState::Connected { chain_id, .. } => Some(*chain_id),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account() -> Address {
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_default_is_disconnected() {
        let snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert_eq!(snapshot.account(), None);
        assert_eq!(snapshot.chain_id(), None);
        assert!(!snapshot.is_connected());
        assert_eq!(snapshot.epoch, 0);
    }

    #[test]
    fn test_connected_exposes_account_and_chain() {
        let snapshot = SessionSnapshot {
            state: ConnectionState::Connected {
                account: test_account(),
                chain_id: ChainId(1),
            },
            ..Default::default()
        };
        assert!(snapshot.is_connected());
        assert_eq!(snapshot.account(), Some(test_account()));
        assert_eq!(snapshot.chain_id(), Some(ChainId(1)));
    }

    #[test]
    fn test_connecting_has_no_account() {
        let snapshot = SessionSnapshot {
            state: ConnectionState::Connecting,
            ..Default::default()
        };
        assert!(snapshot.state.is_connecting());
        assert_eq!(snapshot.account(), None);
        assert_eq!(snapshot.chain_id(), None);
    }

    #[test]
    fn test_snapshot_serializes_with_status_tag() {
        let json = serde_json::to_value(SessionSnapshot::default()).unwrap();
        assert_eq!(json["status"], "disconnected");
        assert_eq!(json["epoch"], 0);
    }
}
