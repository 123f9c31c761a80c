//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Mnemonic (from configuration / caller)
//!     → mnemonic.rs (seed decoding)
//!     → account.rs (Ed25519 key, local signing)
//!     → transaction.rs (build, canonical encoding, transaction id)
//!     → client.rs (algod: params, broadcast, pending status, rounds)
//!
//! kmd.rs talks to the key daemon that holds ephemeral wallet keys.
//! ```
//!
//! # Security Constraints
//! - Mnemonics and private keys are never logged
//! - Keys never leave the process except for the key daemon import
//! - All RPC calls have configurable timeouts

pub mod account;
pub mod address;
pub mod client;
pub mod kmd;
pub mod mnemonic;
pub mod transaction;
pub mod types;

pub use account::Account;
pub use address::Address;
pub use client::{AlgodClient, LedgerNode};
pub use kmd::{KeyDaemon, KmdClient};
pub use types::{BlockchainError, NetworkParams, TxId};
