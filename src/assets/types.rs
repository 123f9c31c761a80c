//! Core data model of the asset lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blockchain::{Account, Address, TxId};

/// Parameters of an asset to create.
///
/// Role addresses and text fields use the empty string for "not set".
/// `creator` of `None` means "the leased signing address".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSpec {
    pub creator: Option<String>,
    pub asset_name: String,
    pub unit_name: String,
    pub total_issuance: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub url: String,
    pub metadata_hash: String,
    pub manager: String,
    pub reserve: String,
    pub freeze: String,
    pub clawback: String,
}

/// Who signs: the account mnemonic and the key daemon wallet that receives
/// the ephemeral key.
#[derive(Clone)]
pub struct SigningIdentity {
    pub mnemonic: String,
    pub wallet_name: String,
    pub wallet_password: String,
}

impl SigningIdentity {
    pub fn new(
        mnemonic: impl Into<String>,
        wallet_name: impl Into<String>,
        wallet_password: impl Into<String>,
    ) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            wallet_name: wallet_name.into(),
            wallet_password: wallet_password.into(),
        }
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("mnemonic", &"<redacted>")
            .field("wallet_name", &self.wallet_name)
            .field("wallet_password", &"<redacted>")
            .finish()
    }
}

/// A key imported into the daemon for the duration of one run.
///
/// Not `Clone`: releasing consumes it.
pub struct LeasedKey {
    pub(crate) wallet_handle: String,
    pub(crate) account: Account,
}

impl LeasedKey {
    pub(crate) fn new(wallet_handle: String, account: Account) -> Self {
        Self {
            wallet_handle,
            account,
        }
    }

    pub fn address(&self) -> Address {
        self.account.address()
    }

    pub(crate) fn account(&self) -> &Account {
        &self.account
    }
}

impl fmt::Debug for LeasedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeasedKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Outcome of waiting for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationResult {
    pub confirmed_round: u64,
    pub tx_id: TxId,
    /// Asset created by the transaction, when the node reports it.
    pub asset_index: Option<u64>,
}

/// A successfully created asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAsset {
    pub asset_id: u64,
    #[serde(rename = "txHash")]
    pub tx_id: TxId,
}
