//! Closed error taxonomy for chain access
//!
//! Provider and contract failures are classified once, at the facade
//! boundary. Callers never see raw transport error shapes.

use alloy::contract::Error as ContractError;
use alloy::providers::PendingTransactionError;
use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

pub type ChainResult<T> = Result<T, ChainError>;

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// A signer is required but no wallet is connected.
    #[error("wallet not connected")]
    NotConnected,

    /// The user declined a password or confirmation prompt.
    #[error("request rejected by user")]
    UserRejected,

    /// The on-chain call reverted; the message carries the node's reason.
    #[error("contract reverted: {0}")]
    ContractRevert(String),

    /// RPC or provider call rejected, timed out, or malformed input.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ChainError {
    fn from_rpc(err: RpcError<TransportErrorKind>) -> Self {
        if let Some(payload) = err.as_error_resp() {
            // Execution reverts come back as JSON-RPC error code 3; some
            // nodes only say "revert" in the message.
            if payload.code == 3 || payload.message.to_lowercase().contains("revert") {
                return ChainError::ContractRevert(payload.message.to_string());
            }
        }
        ChainError::Transport(err.to_string())
    }
}

impl From<RpcError<TransportErrorKind>> for ChainError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        ChainError::from_rpc(err)
    }
}

impl From<ContractError> for ChainError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::TransportError(rpc) => ChainError::from_rpc(rpc),
            other => ChainError::Transport(other.to_string()),
        }
    }
}

impl From<PendingTransactionError> for ChainError {
    fn from(err: PendingTransactionError) -> Self {
        ChainError::Transport(err.to_string())
    }
}
