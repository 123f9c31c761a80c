//! Error taxonomy of the asset lifecycle.

use serde::Serialize;
use thiserror::Error;

use crate::assets::registry::RegistryError;
use crate::blockchain::account::SignError;
use crate::blockchain::mnemonic::MnemonicError;
use crate::blockchain::transaction::BuildError;
use crate::blockchain::{Address, BlockchainError, TxId};

/// Failures of the key lease manager.
#[derive(Debug, Error)]
pub enum LeaseError {
    #[error("wallet '{0}' not found in key daemon")]
    WalletNotFound(String),

    #[error("failed to open wallet handle: {0}")]
    Handle(#[source] BlockchainError),

    #[error("invalid mnemonic: {0}")]
    Mnemonic(#[from] MnemonicError),

    #[error("key import failed: {0}")]
    KeyImport(#[source] BlockchainError),

    #[error("key daemon imported {actual}, expected {expected}")]
    AddressMismatch { expected: Address, actual: String },

    #[error("key release failed: {0}")]
    Release(#[source] BlockchainError),
}

pub type LeaseResult<T> = Result<T, LeaseError>;

/// Coarse error category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Wallet,
    Build,
    Signing,
    Broadcast,
    NodeQuery,
    ConfirmationTimeout,
    Cancelled,
    Discovery,
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Wallet => "wallet",
            ErrorKind::Build => "build",
            ErrorKind::Signing => "signing",
            ErrorKind::Broadcast => "broadcast",
            ErrorKind::NodeQuery => "node_query",
            ErrorKind::ConfirmationTimeout => "confirmation_timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Discovery => "discovery",
            ErrorKind::Persistence => "persistence",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of an orchestration run.
///
/// Variants raised after a successful broadcast carry the transaction id:
/// the transaction may still land on the ledger.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Wallet(#[from] LeaseError),

    #[error("invalid transaction parameters: {0}")]
    Build(#[from] BuildError),

    #[error("signing failed: {0}")]
    Signing(#[from] SignError),

    #[error("broadcast failed: {0}")]
    Broadcast(#[source] BlockchainError),

    #[error("failed to fetch network parameters: {0}")]
    Params(#[source] BlockchainError),

    #[error("node query failed for {tx_id}: {source}")]
    NodeQuery {
        tx_id: TxId,
        source: BlockchainError,
    },

    #[error("transaction {tx_id} rejected from pool: {message}")]
    PoolRejected { tx_id: TxId, message: String },

    #[error("transaction {tx_id} not confirmed before deadline")]
    ConfirmationTimeout { tx_id: TxId },

    #[error("wait for transaction {tx_id} cancelled")]
    Cancelled { tx_id: TxId },

    #[error("could not determine asset id created by {tx_id}: {reason}")]
    Discovery { tx_id: TxId, reason: String },

    #[error("asset {asset_id} created by {tx_id} but not recorded: {source}")]
    Persistence {
        tx_id: TxId,
        asset_id: u64,
        source: RegistryError,
    },
}

impl AssetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssetError::Wallet(_) => ErrorKind::Wallet,
            AssetError::Build(_) => ErrorKind::Build,
            AssetError::Signing(_) => ErrorKind::Signing,
            AssetError::Broadcast(_) => ErrorKind::Broadcast,
            AssetError::Params(_) | AssetError::NodeQuery { .. } | AssetError::PoolRejected { .. } => {
                ErrorKind::NodeQuery
            }
            AssetError::ConfirmationTimeout { .. } => ErrorKind::ConfirmationTimeout,
            AssetError::Cancelled { .. } => ErrorKind::Cancelled,
            AssetError::Discovery { .. } => ErrorKind::Discovery,
            AssetError::Persistence { .. } => ErrorKind::Persistence,
        }
    }

    /// Id of a transaction that was broadcast before the failure.
    pub fn tx_id(&self) -> Option<&TxId> {
        match self {
            AssetError::NodeQuery { tx_id, .. }
            | AssetError::PoolRejected { tx_id, .. }
            | AssetError::ConfirmationTimeout { tx_id }
            | AssetError::Cancelled { tx_id }
            | AssetError::Discovery { tx_id, .. }
            | AssetError::Persistence { tx_id, .. } => Some(tx_id),
            _ => None,
        }
    }
}

pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_tx_id() {
        let err = AssetError::ConfirmationTimeout {
            tx_id: TxId("T1".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::ConfirmationTimeout);
        assert_eq!(err.tx_id().map(TxId::as_str), Some("T1"));

        let err = AssetError::Broadcast(BlockchainError::Rpc("refused".to_string()));
        assert_eq!(err.kind(), ErrorKind::Broadcast);
        assert!(err.tx_id().is_none());

        let err = AssetError::from(LeaseError::WalletNotFound("ops".to_string()));
        assert_eq!(err.kind(), ErrorKind::Wallet);
        assert_eq!(err.to_string(), "wallet 'ops' not found in key daemon");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        for kind in [
            ErrorKind::NodeQuery,
            ErrorKind::ConfirmationTimeout,
            ErrorKind::Validation,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }
    }
}
