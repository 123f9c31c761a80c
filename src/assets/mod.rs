//! Asset lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! SigningIdentity + AssetSpec
//!     → orchestrator.rs
//!         → lease.rs (import ephemeral key into the key daemon)
//!         → blockchain::transaction (build unsigned transaction)
//!         → submission.rs (sign locally, broadcast)
//!         → confirmation.rs (poll until included in a round)
//!         → lease.rs (delete ephemeral key)
//!     → registry.rs (record created asset against its owner)
//! ```
//!
//! # Design Decisions
//! - Collaborators are traits (`LedgerNode`, `KeyDaemon`, `AssetRegistry`)
//! - Each run is one sequential async flow with its own `Deadline`
//! - Releasing a lease consumes it; it cannot be released twice

pub mod confirmation;
pub mod error;
pub mod lease;
pub mod orchestrator;
pub mod registry;
pub mod submission;
pub mod types;

pub use error::{AssetError, AssetResult, ErrorKind, LeaseError};
pub use orchestrator::AssetLifecycle;
pub use registry::{AssetRegistry, JsonFileRegistry, MemoryRegistry, RegistryError};
pub use types::{AssetSpec, ConfirmationResult, CreatedAsset, LeasedKey, SigningIdentity};
