//! JSON-RPC backed wallet provider.
//!
//! # Responsibilities
//! - Hold one alloy HTTP provider per configured network
//! - Serve account and chain queries from the active network
//! - Switch the active network and notify subscribers
//! - Handle timeouts and network errors gracefully
//!
//! This is the native analogue of an injected browser provider: the set of
//! configured networks plays the role of the chains registered with the
//! wallet, and switching to anything else is rejected as unknown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::config::SessionConfig;
use crate::provider::types::{
    Address, ChainId, EventFanout, ProviderError, ProviderEvent, ProviderResult,
};
use crate::provider::WalletProvider;

struct Endpoint {
    name: String,
    provider: Arc<dyn Provider + Send + Sync>,
}

/// Wallet provider backed by one JSON-RPC endpoint per network.
pub struct RpcProvider {
    endpoints: HashMap<ChainId, Endpoint>,
    active: Mutex<ChainId>,
    fanout: EventFanout,
    timeout_duration: Duration,
}

impl RpcProvider {
    /// Build a provider from a validated session configuration.
    ///
    /// The first configured network is the initially active one. A config
    /// with no networks yields [`ProviderError::Unavailable`], the native
    /// equivalent of "no wallet extension present".
    pub fn from_config(config: &SessionConfig) -> ProviderResult<Self> {
        let first = config.networks.first().ok_or_else(|| {
            ProviderError::Unavailable("no networks configured".to_string())
        })?;

        let mut endpoints = HashMap::new();
        for network in &config.networks {
            let rpc_url: url::Url = network.rpc_url.parse().map_err(|e| {
                ProviderError::Rpc(format!("invalid RPC URL '{}': {}", network.rpc_url, e))
            })?;
            endpoints.insert(
                ChainId(network.chain_id),
                Endpoint {
                    name: network.name.clone(),
                    provider: Arc::new(ProviderBuilder::new().connect_http(rpc_url))
                        as Arc<dyn Provider + Send + Sync>,
                },
            );
        }

        tracing::info!(
            networks = endpoints.len(),
            active_chain = first.chain_id,
            "RPC provider initialized"
        );

        Ok(Self {
            endpoints,
            active: Mutex::new(ChainId(first.chain_id)),
            fanout: EventFanout::new(),
            timeout_duration: Duration::from_secs(config.connect_timeout_secs),
        })
    }

    /// The chain the provider currently targets, without a network call.
    pub fn active_chain(&self) -> ChainId {
        *self.active.lock().expect("active chain mutex poisoned")
    }

    fn active_endpoint(&self) -> (ChainId, Arc<dyn Provider + Send + Sync>) {
        let active = self.active_chain();
        let endpoint = &self.endpoints[&active];
        (active, endpoint.provider.clone())
    }

    async fn with_timeout<T, F>(&self, fut: F) -> ProviderResult<T>
    where
        F: std::future::Future<Output = Result<T, alloy::transports::TransportError>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ProviderError::Rpc(e.to_string())),
            Err(_) => Err(ProviderError::Timeout(self.timeout_duration.as_secs())),
        }
    }
}

#[async_trait]
impl WalletProvider for RpcProvider {
    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        let (chain, provider) = self.active_endpoint();
        let accounts = self.with_timeout(provider.get_accounts()).await?;
        tracing::debug!(chain_id = %chain, count = accounts.len(), "accounts fetched");
        Ok(accounts)
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        let (active, provider) = self.active_endpoint();
        let reported = ChainId(self.with_timeout(provider.get_chain_id()).await?);
        if reported != active {
            tracing::warn!(
                configured = %active,
                reported = %reported,
                "endpoint reports a different chain than configured"
            );
        }
        Ok(reported)
    }

    async fn switch_chain(&self, target: ChainId) -> ProviderResult<()> {
        let name = match self.endpoints.get(&target) {
            Some(endpoint) => endpoint.name.clone(),
            None => return Err(ProviderError::UnknownChain(target)),
        };

        {
            let mut active = self.active.lock().expect("active chain mutex poisoned");
            if *active == target {
                tracing::debug!(chain_id = %target, "already targeting requested chain");
                return Ok(());
            }
            *active = target;
        }

        tracing::info!(chain_id = %target, network = %name, "switched active network");
        self.fanout.emit(ProviderEvent::ChainChanged(target));
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        self.fanout.subscribe()
    }
}

impl std::fmt::Debug for RpcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcProvider")
            .field("networks", &self.endpoints.len())
            .field("active", &self.active_chain())
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}
