//! Scriptable in-memory wallet provider for tests and demos.
//!
//! All knobs take `&self` so a single `Arc<MockProvider>` can be shared
//! between the session under test and the test body: script responses,
//! inject events, and assert on call counters while the session runs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};

use crate::provider::types::{
    Address, ChainId, EventFanout, ProviderError, ProviderEvent, ProviderResult,
};
use crate::provider::WalletProvider;

/// Programmable wallet provider.
///
/// Defaults to an available provider exposing no accounts on chain 1, with
/// chain 1 as the only registered network.
pub struct MockProvider {
    accounts: Mutex<Vec<Address>>,
    chain: Mutex<ChainId>,
    known_chains: Mutex<HashSet<ChainId>>,
    available: AtomicBool,
    rejection: Mutex<Option<String>>,
    hold: Mutex<Option<Arc<Semaphore>>>,
    account_requests: AtomicUsize,
    switch_requests: AtomicUsize,
    fanout: EventFanout,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            chain: Mutex::new(ChainId(1)),
            known_chains: Mutex::new(HashSet::from([ChainId(1)])),
            available: AtomicBool::new(true),
            rejection: Mutex::new(None),
            hold: Mutex::new(None),
            account_requests: AtomicUsize::new(0),
            switch_requests: AtomicUsize::new(0),
            fanout: EventFanout::new(),
        }
    }

    /// Script the accounts returned by `request_accounts`.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().expect("mock accounts mutex poisoned") = accounts;
    }

    /// Script the current chain and register it as known.
    pub fn set_chain(&self, chain: ChainId) {
        *self.chain.lock().expect("mock chain mutex poisoned") = chain;
        self.register_chain(chain);
    }

    /// Register a chain so `switch_chain` accepts it.
    pub fn register_chain(&self, chain: ChainId) {
        self.known_chains
            .lock()
            .expect("mock known chains mutex poisoned")
            .insert(chain);
    }

    /// Make every call fail with `Unavailable` (no extension present).
    pub fn set_unavailable(&self) {
        self.available.store(false, Ordering::SeqCst);
    }

    /// Make the next `request_accounts` fail with `UserRejected`.
    pub fn reject_next_request(&self, message: &str) {
        *self.rejection.lock().expect("mock rejection mutex poisoned") =
            Some(message.to_string());
    }

    /// Hold `request_accounts` calls in flight until [`Self::release_requests`].
    pub fn hold_requests(&self) {
        *self.hold.lock().expect("mock hold mutex poisoned") =
            Some(Arc::new(Semaphore::new(0)));
    }

    /// Release calls parked by [`Self::hold_requests`].
    pub fn release_requests(&self) {
        if let Some(gate) = self.hold.lock().expect("mock hold mutex poisoned").take() {
            gate.close();
        }
    }

    /// Number of `request_accounts` calls observed.
    pub fn account_request_count(&self) -> usize {
        self.account_requests.load(Ordering::SeqCst)
    }

    /// Number of `switch_chain` calls observed.
    pub fn switch_request_count(&self) -> usize {
        self.switch_requests.load(Ordering::SeqCst)
    }

    /// Inject an `accountsChanged` notification.
    pub fn emit_accounts_changed(&self, accounts: Vec<Address>) {
        self.fanout.emit(ProviderEvent::AccountsChanged(accounts));
    }

    /// Inject a `chainChanged` notification.
    pub fn emit_chain_changed(&self, chain: ChainId) {
        *self.chain.lock().expect("mock chain mutex poisoned") = chain;
        self.fanout.emit(ProviderEvent::ChainChanged(chain));
    }

    async fn wait_if_held(&self) {
        let gate = self.hold.lock().expect("mock hold mutex poisoned").clone();
        if let Some(gate) = gate {
            // Closed on release; the resulting error just means "go ahead"
            let _ = gate.acquire().await;
        }
    }

    fn check_available(&self) -> ProviderResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProviderError::Unavailable(
                "no wallet provider injected".to_string(),
            ))
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        self.account_requests.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.wait_if_held().await;

        if let Some(message) = self
            .rejection
            .lock()
            .expect("mock rejection mutex poisoned")
            .take()
        {
            return Err(ProviderError::UserRejected(message));
        }

        Ok(self
            .accounts
            .lock()
            .expect("mock accounts mutex poisoned")
            .clone())
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        self.check_available()?;
        Ok(*self.chain.lock().expect("mock chain mutex poisoned"))
    }

    async fn switch_chain(&self, target: ChainId) -> ProviderResult<()> {
        self.switch_requests.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let known = self
            .known_chains
            .lock()
            .expect("mock known chains mutex poisoned")
            .contains(&target);
        if !known {
            return Err(ProviderError::UnknownChain(target));
        }

        *self.chain.lock().expect("mock chain mutex poisoned") = target;
        self.fanout.emit(ProviderEvent::ChainChanged(target));
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        self.fanout.subscribe()
    }
}
