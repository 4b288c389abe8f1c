//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value ranges and referential integrity (unique chain ids,
//!   parseable endpoints)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: `SessionConfig -> Result<(), Vec<_>>`
//! - Runs before a config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::SessionConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("connect_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("network at index {0} has an empty name")]
    EmptyNetworkName(usize),

    #[error("duplicate chain_id {0}")]
    DuplicateChainId(u64),

    #[error("network '{name}' has invalid rpc_url '{rpc_url}': {reason}")]
    InvalidRpcUrl {
        name: String,
        rpc_url: String,
        reason: String,
    },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &SessionConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut seen_chains = HashSet::new();
    for (i, network) in config.networks.iter().enumerate() {
        if network.name.trim().is_empty() {
            errors.push(ValidationError::EmptyNetworkName(i));
        }
        if !seen_chains.insert(network.chain_id) {
            errors.push(ValidationError::DuplicateChainId(network.chain_id));
        }
        if let Err(e) = network.rpc_url.parse::<url::Url>() {
            errors.push(ValidationError::InvalidRpcUrl {
                name: network.name.clone(),
                rpc_url: network.rpc_url.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::NetworkConfig;

    fn network(name: &str, chain_id: u64, rpc_url: &str) -> NetworkConfig {
        NetworkConfig {
            name: name.to_string(),
            chain_id,
            rpc_url: rpc_url.to_string(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SessionConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = SessionConfig {
            connect_timeout_secs: 0,
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroTimeout));
    }

    #[test]
    fn test_duplicate_chain_id_rejected() {
        let config = SessionConfig {
            networks: vec![
                network("mainnet", 1, "https://a.example.org"),
                network("mainnet-backup", 1, "https://b.example.org"),
            ],
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateChainId(1)]);
    }

    #[test]
    fn test_collects_all_errors() {
        let config = SessionConfig {
            connect_timeout_secs: 0,
            networks: vec![network("", 1, "not a url")],
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
