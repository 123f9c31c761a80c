//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, body limit, tracing)
//!     → middleware.rs (request metrics)
//!     → request.rs (deserialize, validate)
//!     → handlers.rs (spawn orchestration run, await it)
//!     → response.rs (shape body, map errors to status)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
