//! Ledger-specific types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::address::Address;

// Re-export client configs from config module to avoid duplication
pub use crate::config::schema::{AlgodConfig, KmdConfig};

/// Number of rounds a transaction stays valid after its first valid round.
pub const VALID_ROUND_WINDOW: u64 = 1000;

/// Errors that can occur while talking to the ledger node or the key daemon.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Transport failure (connection refused, DNS, TLS).
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Request did not complete within the configured timeout.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The service answered with an error status.
    #[error("{service} rejected request ({status}): {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl BlockchainError {
    /// True when the remote service processed the request and refused it.
    pub fn is_rejection(&self) -> bool {
        matches!(self, BlockchainError::Rejected { .. })
    }
}

/// Result type for ledger and key daemon operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Transaction identifier as reported by the ledger (52 base32 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl TxId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TxId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Network parameters used to build a single transaction.
///
/// Fetched fresh for every transaction; a stale value risks signing a
/// transaction outside the valid round window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    /// Suggested fee per byte in microAlgos.
    pub fee_per_byte: u64,
    /// Minimum flat fee in microAlgos.
    pub min_fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

impl NetworkParams {
    /// Build params starting at `first_valid`; the last valid round is derived
    /// from [`VALID_ROUND_WINDOW`].
    pub fn new(
        fee_per_byte: u64,
        min_fee: u64,
        first_valid: u64,
        genesis_id: impl Into<String>,
        genesis_hash: [u8; 32],
    ) -> Self {
        Self {
            fee_per_byte,
            min_fee,
            first_valid,
            last_valid: first_valid.saturating_add(VALID_ROUND_WINDOW),
            genesis_id: genesis_id.into(),
            genesis_hash,
        }
    }
}

/// Pending-transaction view returned by the ledger node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Round the transaction was included in; 0 while still pending.
    pub confirmed_round: u64,
    /// Non-empty when the node dropped the transaction from its pool.
    pub pool_error: String,
    /// Index of the asset created by this transaction, if any.
    pub asset_index: Option<u64>,
}

/// Node status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStatus {
    pub last_round: u64,
}

/// Subset of account state needed for asset discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    /// Indexes of assets created by the account.
    pub created_assets: Vec<u64>,
}

/// A wallet known to the key daemon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletSummary {
    pub id: String,
    pub name: String,
}

/// Opaque signed transaction bytes plus their identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub bytes: Vec<u8>,
    pub tx_id: TxId,
    pub sender: Address,
}
