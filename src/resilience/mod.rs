//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to ledger node / key daemon:
//!     → client timeout (per RPC, in blockchain::client)
//!     → timeouts.rs (run-level Deadline: expiry + cancellation)
//!     → On transient failure: backoff.rs (jittered delay before re-poll)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Only read-only status queries are re-polled; broadcasts are never retried
//! - Cancellation comes from the shutdown broadcast

pub mod backoff;
pub mod timeouts;

pub use backoff::calculate_backoff;
pub use timeouts::{Deadline, Interrupted};
