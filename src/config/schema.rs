//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config files,
//! with defaults so a missing file section never fails parsing.

use serde::{Deserialize, Serialize};

/// Root configuration for a wallet session.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Deadline for individual provider requests in seconds.
    pub connect_timeout_secs: u64,

    /// Networks the RPC provider knows how to target. The first entry is
    /// the initially active network.
    pub networks: Vec<NetworkConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            networks: Vec::new(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// A chain the RPC provider can target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Human-readable network name for logging (e.g., "mainnet").
    pub name: String,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 11155111 for Sepolia).
    pub chain_id: u64,

    /// JSON-RPC endpoint URL for this chain.
    pub rpc_url: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
