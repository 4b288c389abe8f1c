//! Shared utilities for session integration tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use wallet_session::provider::mock::MockProvider;
use wallet_session::{Address, SessionSnapshot, Shutdown, WalletProvider, WalletSession};

pub fn test_account() -> Address {
    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        .parse()
        .unwrap()
}

/// A session wired to a scriptable provider with its event pump running.
pub struct Harness {
    pub provider: Arc<MockProvider>,
    pub session: Arc<WalletSession>,
    pub shutdown: Shutdown,
    pub pump: JoinHandle<()>,
}

/// Start a session over a mock provider exposing one account on chain 1.
pub fn start_session() -> Harness {
    let provider = Arc::new(MockProvider::new());
    provider.set_accounts(vec![test_account()]);

    let session = Arc::new(WalletSession::new(
        provider.clone() as Arc<dyn WalletProvider>,
    ));
    let shutdown = Shutdown::new();
    let pump = tokio::spawn({
        let session = session.clone();
        let signal = shutdown.subscribe();
        async move { session.run(signal).await }
    });

    Harness {
        provider,
        session,
        shutdown,
        pump,
    }
}

/// Wait (bounded) until the watched snapshot satisfies the predicate.
pub async fn wait_for<F>(
    rx: &mut watch::Receiver<SessionSnapshot>,
    mut pred: F,
) -> SessionSnapshot
where
    F: FnMut(&SessionSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if pred(&snapshot) {
                    return snapshot.clone();
                }
            }
            rx.changed().await.expect("session dropped");
        }
    })
    .await
    .expect("snapshot condition not reached in time")
}
