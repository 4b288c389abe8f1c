//! The wallet session state container.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc, watch};

use crate::provider::types::{Address, ChainId, ProviderEvent};
use crate::provider::WalletProvider;
use crate::session::state::{ConnectionState, SessionSnapshot};
use crate::session::types::{SessionError, SessionResult};

struct SessionInner {
    state: ConnectionState,
    last_error: Option<String>,
    epoch: u64,
}

/// Tracks a single wallet connection and mediates between callers and the
/// wallet provider.
///
/// Sessions are plain owned objects: create as many as needed, there is no
/// process-wide singleton. All mutations flow through the operations here
/// and through [`Self::apply_event`]; consumers observe the resulting
/// [`SessionSnapshot`]s via [`Self::watch`] rather than raw provider events.
pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    inner: Mutex<SessionInner>,
    watch_tx: watch::Sender<SessionSnapshot>,
    /// Taken by the first `run` call; the pump is single-consumer.
    events: Mutex<Option<mpsc::UnboundedReceiver<ProviderEvent>>>,
}

impl WalletSession {
    /// Create an empty session (`Disconnected`) on the given provider.
    ///
    /// Subscribes to provider notifications immediately so nothing emitted
    /// between construction and [`Self::run`] is lost.
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        let events = provider.subscribe();
        let (watch_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            provider,
            inner: Mutex::new(SessionInner {
                state: ConnectionState::Disconnected,
                last_error: None,
                epoch: 0,
            }),
            watch_tx,
            events: Mutex::new(Some(events)),
        }
    }

    /// Connect to the wallet: request accounts and the current chain.
    ///
    /// A call while a connect is already in flight is a no-op returning the
    /// current snapshot; at most one provider request is outstanding at a
    /// time. On failure the session reverts to `Disconnected` with
    /// `last_error` set, and the error is returned. No automatic retries;
    /// the caller may simply call `connect` again.
    pub async fn connect(&self) -> SessionResult<SessionSnapshot> {
        {
            let mut inner = self.inner.lock().expect("session mutex poisoned");
            if inner.state.is_connecting() {
                tracing::debug!("connect already in flight, ignoring duplicate request");
                return Ok(snapshot_of(&inner));
            }
            inner.state = ConnectionState::Connecting;
            self.publish(&inner);
        }

        match self.establish().await {
            Ok((account, chain_id)) => {
                let mut inner = self.inner.lock().expect("session mutex poisoned");
                inner.state = ConnectionState::Connected { account, chain_id };
                inner.last_error = None;
                let snapshot = self.publish(&inner);
                tracing::info!(account = %account, chain_id = %chain_id, "wallet connected");
                Ok(snapshot)
            }
            Err(e) => {
                let mut inner = self.inner.lock().expect("session mutex poisoned");
                inner.state = ConnectionState::Disconnected;
                inner.last_error = Some(e.to_string());
                self.publish(&inner);
                tracing::warn!(error = %e, "wallet connect failed");
                Err(e)
            }
        }
    }

    async fn establish(&self) -> SessionResult<(Address, ChainId)> {
        let accounts = self.provider.request_accounts().await?;
        let account = accounts.first().copied().ok_or_else(|| {
            SessionError::Provider("provider returned no accounts".to_string())
        })?;
        let chain_id = self.provider.chain_id().await?;
        Ok((account, chain_id))
    }

    /// Drop the connection. Purely local, no provider call.
    pub fn disconnect(&self) -> SessionSnapshot {
        let mut inner = self.inner.lock().expect("session mutex poisoned");
        inner.state = ConnectionState::Disconnected;
        inner.last_error = None;
        let snapshot = self.publish(&inner);
        tracing::info!("wallet disconnected");
        snapshot
    }

    /// Ask the provider to target a different chain.
    ///
    /// Requires a connected account; otherwise errors with
    /// [`SessionError::NotConnected`] before any provider contact. On any
    /// provider rejection the session state is unchanged and the error
    /// propagates ([`SessionError::UnknownNetwork`] for unregistered
    /// chains, so callers can offer to add the network). On success the
    /// new chain arrives through the provider's `ChainChanged` event, not
    /// by direct mutation here.
    pub async fn switch_network(&self, target: ChainId) -> SessionResult<()> {
        {
            let inner = self.inner.lock().expect("session mutex poisoned");
            if !inner.state.is_connected() {
                return Err(SessionError::NotConnected);
            }
        }

        self.provider.switch_chain(target).await.map_err(|e| {
            tracing::warn!(chain_id = %target, error = %e, "network switch rejected");
            SessionError::from(e)
        })?;

        tracing::info!(chain_id = %target, "network switch accepted by provider");
        Ok(())
    }

    /// Apply one provider notification.
    ///
    /// Called sequentially by the event pump; mutations take effect in
    /// arrival order, so a notification racing an in-flight connect is
    /// never lost and the last applied mutation wins.
    pub fn apply_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => {
                    tracing::info!("provider reports zero accounts, disconnecting");
                    self.disconnect();
                }
                Some(&next) => {
                    let mut guard = self.inner.lock().expect("session mutex poisoned");
                    let inner = &mut *guard;
                    let changed = match &mut inner.state {
                        ConnectionState::Connected { account, .. } if *account != next => {
                            *account = next;
                            true
                        }
                        ConnectionState::Connected { .. } => false,
                        _ => {
                            // No chain is known yet, so a Connected state
                            // cannot be formed from this event alone.
                            tracing::debug!(account = %next, "account change while not connected, ignored");
                            false
                        }
                    };
                    if changed {
                        tracing::info!(account = %next, "active account changed");
                        self.publish(inner);
                    }
                }
            },
            ProviderEvent::ChainChanged(next) => {
                let mut guard = self.inner.lock().expect("session mutex poisoned");
                let inner = &mut *guard;
                let changed = match &mut inner.state {
                    ConnectionState::Connected { chain_id, .. } if *chain_id != next => {
                        *chain_id = next;
                        true
                    }
                    ConnectionState::Connected { .. } => false,
                    _ => {
                        tracing::debug!(chain_id = %next, "chain change while not connected, ignored");
                        false
                    }
                };
                if changed {
                    inner.epoch += 1;
                    tracing::info!(
                        chain_id = %next,
                        epoch = inner.epoch,
                        "chain changed, chain-bound handles must be rebuilt"
                    );
                    self.publish(inner);
                }
            }
        }
    }

    /// Consume provider notifications until the channel closes or the
    /// shutdown signal fires.
    ///
    /// Only the first call gets the event stream; subsequent calls return
    /// immediately.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut events = match self
            .events
            .lock()
            .expect("session mutex poisoned")
            .take()
        {
            Some(events) => events,
            None => {
                tracing::warn!("event pump already started, ignoring");
                return;
            }
        };

        tracing::debug!("event pump started");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.apply_event(event),
                    None => {
                        tracing::debug!("provider event channel closed");
                        break;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::debug!("shutdown signal received");
                    break;
                }
            }
        }
        tracing::debug!("event pump stopped");
    }

    /// Current state of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        snapshot_of(&self.inner.lock().expect("session mutex poisoned"))
    }

    /// Observe every published snapshot.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.watch_tx.subscribe()
    }

    fn publish(&self, inner: &SessionInner) -> SessionSnapshot {
        let snapshot = snapshot_of(inner);
        self.watch_tx.send_replace(snapshot.clone());
        snapshot
    }
}

fn snapshot_of(inner: &SessionInner) -> SessionSnapshot {
    SessionSnapshot {
        state: inner.state.clone(),
        last_error: inner.last_error.clone(),
        epoch: inner.epoch,
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().expect("session mutex poisoned");
        f.debug_struct("WalletSession")
            .field("state", &inner.state)
            .field("epoch", &inner.epoch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;

    fn test_account() -> Address {
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
            .parse()
            .unwrap()
    }

    fn other_account() -> Address {
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
            .parse()
            .unwrap()
    }

    fn connected_session() -> (Arc<MockProvider>, WalletSession) {
        let provider = Arc::new(MockProvider::new());
        provider.set_accounts(vec![test_account()]);
        (provider.clone(), WalletSession::new(provider))
    }

    #[tokio::test]
    async fn test_connect_happy_path() {
        let (_, session) = connected_session();

        let snapshot = session.connect().await.unwrap();

        assert!(snapshot.is_connected());
        assert_eq!(snapshot.account(), Some(test_account()));
        assert_eq!(snapshot.chain_id(), Some(ChainId(1)));
        assert_eq!(snapshot.last_error, None);
    }

    #[tokio::test]
    async fn test_connect_user_rejected() {
        let (provider, session) = connected_session();
        provider.reject_next_request("user rejected");

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::UserRejected(_)));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert_eq!(snapshot.account(), None);
        assert!(snapshot.last_error.unwrap().contains("user rejected"));
    }

    #[tokio::test]
    async fn test_connect_provider_unavailable() {
        let provider = Arc::new(MockProvider::new());
        provider.set_unavailable();
        let session = WalletSession::new(provider);

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::ProviderUnavailable(_)));
        assert_eq!(session.snapshot().state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_no_accounts() {
        let provider = Arc::new(MockProvider::new());
        let session = WalletSession::new(provider);

        let err = session.connect().await.unwrap_err();
        assert!(err.to_string().contains("no accounts"));
        assert_eq!(session.snapshot().state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_duplicate_connect_is_noop() {
        let (provider, session) = connected_session();
        let session = Arc::new(session);
        provider.hold_requests();

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.connect().await }
        });
        tokio::task::yield_now().await;
        assert!(session.snapshot().state.is_connecting());

        // Second connect must not issue another provider request
        let second = session.connect().await.unwrap();
        assert!(second.state.is_connecting());
        assert_eq!(provider.account_request_count(), 1);

        provider.release_requests();
        let snapshot = first.await.unwrap().unwrap();
        assert_eq!(snapshot.account(), Some(test_account()));
    }

    #[tokio::test]
    async fn test_reconnect_after_failure() {
        let (provider, session) = connected_session();
        provider.reject_next_request("user rejected");

        assert!(session.connect().await.is_err());
        // Retry is just calling connect again
        let snapshot = session.connect().await.unwrap();
        assert!(snapshot.is_connected());
        assert_eq!(snapshot.last_error, None);
    }

    #[tokio::test]
    async fn test_disconnect_clears_everything() {
        let (_, session) = connected_session();
        session.connect().await.unwrap();

        let snapshot = session.disconnect();

        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert_eq!(snapshot.account(), None);
        assert_eq!(snapshot.chain_id(), None);
        assert_eq!(snapshot.last_error, None);
    }

    #[tokio::test]
    async fn test_account_iff_connected_invariant() {
        let (_, session) = connected_session();

        for _ in 0..3 {
            let snapshot = session.connect().await.unwrap();
            assert_eq!(snapshot.account().is_some(), snapshot.is_connected());
            assert_eq!(snapshot.chain_id().is_some(), snapshot.account().is_some());

            let snapshot = session.disconnect();
            assert_eq!(snapshot.account().is_some(), snapshot.is_connected());
            assert_eq!(snapshot.chain_id().is_some(), snapshot.account().is_some());
        }
    }

    #[tokio::test]
    async fn test_switch_requires_connection() {
        let (provider, session) = connected_session();

        let err = session.switch_network(ChainId(11155111)).await.unwrap_err();

        assert!(matches!(err, SessionError::NotConnected));
        // The provider was never contacted
        assert_eq!(provider.switch_request_count(), 0);
    }

    #[tokio::test]
    async fn test_switch_unknown_network_leaves_state_unchanged() {
        let (provider, session) = connected_session();
        session.connect().await.unwrap();
        let before = session.snapshot();

        let err = session.switch_network(ChainId(999999)).await.unwrap_err();

        assert!(matches!(err, SessionError::UnknownNetwork(ChainId(999999))));
        assert_eq!(provider.switch_request_count(), 1);
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test]
    async fn test_accounts_changed_empty_disconnects_from_any_state() {
        let (_, session) = connected_session();
        session.connect().await.unwrap();

        session.apply_event(ProviderEvent::AccountsChanged(vec![]));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert_eq!(snapshot.account(), None);
        assert_eq!(snapshot.chain_id(), None);

        // Also a no-op-safe operation when already disconnected
        session.apply_event(ProviderEvent::AccountsChanged(vec![]));
        assert_eq!(session.snapshot().state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_accounts_changed_replaces_account() {
        let (_, session) = connected_session();
        session.connect().await.unwrap();

        session.apply_event(ProviderEvent::AccountsChanged(vec![
            other_account(),
            test_account(),
        ]));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.account(), Some(other_account()));
        // Chain is untouched by an account change
        assert_eq!(snapshot.chain_id(), Some(ChainId(1)));
    }

    #[tokio::test]
    async fn test_accounts_changed_ignored_while_disconnected() {
        let (_, session) = connected_session();

        session.apply_event(ProviderEvent::AccountsChanged(vec![other_account()]));

        assert_eq!(session.snapshot().state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_chain_changed_updates_chain_and_epoch() {
        let (_, session) = connected_session();
        session.connect().await.unwrap();
        assert_eq!(session.snapshot().epoch, 0);

        // Sepolia announced as a hex chainChanged payload
        let sepolia = ChainId::from_hex_str("0xaa36a7").unwrap();
        session.apply_event(ProviderEvent::ChainChanged(sepolia));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.chain_id(), Some(ChainId(11155111)));
        assert_eq!(snapshot.account(), Some(test_account()));
        assert_eq!(snapshot.epoch, 1);
    }

    #[tokio::test]
    async fn test_chain_changed_ignored_while_disconnected() {
        let (_, session) = connected_session();

        session.apply_event(ProviderEvent::ChainChanged(ChainId(5)));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert_eq!(snapshot.epoch, 0);
    }

    #[tokio::test]
    async fn test_watch_observes_transitions() {
        let (_, session) = connected_session();
        let mut rx = session.watch();
        assert_eq!(rx.borrow().state, ConnectionState::Disconnected);

        session.connect().await.unwrap();

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_connected());
    }

    #[tokio::test]
    async fn test_independent_sessions_coexist() {
        let (_, a) = connected_session();
        let provider_b = Arc::new(MockProvider::new());
        provider_b.set_accounts(vec![other_account()]);
        let b = WalletSession::new(provider_b);

        a.connect().await.unwrap();
        b.connect().await.unwrap();
        a.disconnect();

        assert!(!a.snapshot().is_connected());
        assert_eq!(b.snapshot().account(), Some(other_account()));
    }
}
