//! Local account keys and transaction signing.
//!
//! # Security
//! - Key material is derived from a mnemonic and held only in memory
//! - Keys and mnemonics are never logged; `Debug` shows the address only
//! - Signing happens locally; the ledger node only ever sees signed bytes

use ed25519_dalek::{Signer, SigningKey};
use thiserror::Error;

use crate::blockchain::address::Address;
use crate::blockchain::mnemonic::{self, MnemonicError};
use crate::blockchain::transaction::{BuildError, UnsignedTxn};
use crate::blockchain::types::SignedTransaction;

/// Errors raised while signing a transaction.
#[derive(Debug, Error)]
pub enum SignError {
    /// The transaction sender is not the address of the signing key.
    #[error("transaction sender {sender} does not match signing key {signer}")]
    SenderMismatch { sender: Address, signer: Address },

    #[error(transparent)]
    Encoding(#[from] BuildError),
}

/// An Ed25519 account able to sign transactions.
#[derive(Clone)]
pub struct Account {
    signing_key: SigningKey,
    address: Address,
}

impl Account {
    /// Create an account from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let address = Address::from_public_key(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// Derive an account from a 25-word mnemonic.
    pub fn from_mnemonic(phrase: &str) -> Result<Self, MnemonicError> {
        mnemonic::to_seed(phrase).map(Self::from_seed)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The 64-byte private key (seed followed by public key) as the key
    /// daemon expects it on import.
    pub fn private_key(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn mnemonic(&self) -> String {
        mnemonic::from_seed(&self.signing_key.to_bytes())
    }

    /// Sign a transaction whose sender must be this account.
    pub fn sign_transaction(&self, txn: &UnsignedTxn) -> Result<SignedTransaction, SignError> {
        if txn.sender != self.address {
            return Err(SignError::SenderMismatch {
                sender: txn.sender,
                signer: self.address,
            });
        }

        let message = txn.bytes_to_sign()?;
        let signature = self.signing_key.sign(&message).to_bytes();
        let bytes = txn.encode_signed(&signature)?;

        Ok(SignedTransaction {
            bytes,
            tx_id: txn.id()?,
            sender: self.address,
        })
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
