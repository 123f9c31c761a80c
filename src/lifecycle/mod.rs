//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Cancel in-flight confirmation
//!     waits → Runs release their keys → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup lives in main: config, clients, registry, listener
//! - Cancellation reaches waiters, never the key release step

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
