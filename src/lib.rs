//! Algorand asset manager library.

pub mod assets;
pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use assets::AssetLifecycle;
pub use config::schema::AssetManagerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
