//! Session error definitions.

use thiserror::Error;

use crate::provider::types::{ChainId, ProviderError};

/// Errors surfaced by session operations.
///
/// None of these are fatal: the session either reverts to `Disconnected`
/// (failed connect) or stays unchanged (failed switch), and the caller
/// decides whether to retry or inform the user.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No wallet provider is reachable.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The user declined the connection or switch prompt.
    #[error("user rejected: {0}")]
    UserRejected(String),

    /// The switch target is not registered with the provider. Callers may
    /// offer to add the network instead of treating this as fatal.
    #[error("unknown network: chain {0} is not registered with the provider")]
    UnknownNetwork(ChainId),

    /// `switch_network` requires a connected account.
    #[error("no wallet connected")]
    NotConnected,

    /// The provider did not answer within the configured deadline.
    #[error("provider request timed out after {0} seconds")]
    Timeout(u64),

    /// Any other provider failure, message attached verbatim.
    #[error("provider error: {0}")]
    Provider(String),
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable(msg) => SessionError::ProviderUnavailable(msg),
            ProviderError::UserRejected(msg) => SessionError::UserRejected(msg),
            ProviderError::UnknownChain(chain) => SessionError::UnknownNetwork(chain),
            ProviderError::Timeout(secs) => SessionError::Timeout(secs),
            ProviderError::Rpc(msg) => SessionError::Provider(msg),
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_mapping() {
        let err: SessionError = ProviderError::UnknownChain(ChainId(999999)).into();
        assert!(matches!(err, SessionError::UnknownNetwork(ChainId(999999))));

        let err: SessionError = ProviderError::UserRejected("user rejected".to_string()).into();
        assert!(err.to_string().contains("user rejected"));
    }

    #[test]
    fn test_error_display() {
        let err = SessionError::NotConnected;
        assert_eq!(err.to_string(), "no wallet connected");

        let err = SessionError::UnknownNetwork(ChainId(999999));
        assert!(err.to_string().contains("999999"));
    }
}
