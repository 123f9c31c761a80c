//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, run_id spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (tx_id, address, asset_id, run_id) on every event
//! - Request ID flows from the HTTP layer into each orchestration span
//! - Metrics are cheap (atomic increments)
//! - Key material never reaches either sink

pub mod logging;
pub mod metrics;
