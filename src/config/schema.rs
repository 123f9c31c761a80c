//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the asset
//! manager. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

/// Root configuration for the asset manager.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AssetManagerConfig {
    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Ledger node connection.
    pub algod: AlgodConfig,

    /// Key daemon connection.
    pub kmd: KmdConfig,

    /// Signing identity used by the HTTP surface.
    pub signing: SigningConfig,

    /// Confirmation wait policy.
    pub confirmation: ConfirmationConfig,

    /// Asset ownership persistence.
    pub registry: RegistryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// How long shutdown waits for in-flight runs to release their keys.
    pub drain_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 64 * 1024,
            drain_timeout_secs: 30,
        }
    }
}

/// Ledger node (`algod`) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlgodConfig {
    /// REST endpoint URL.
    pub url: String,

    /// API token sent in `X-Algo-API-Token`.
    pub token: String,

    /// Timeout for ordinary RPC requests in seconds.
    pub rpc_timeout_secs: u64,

    /// Timeout for the wait-for-round long poll in seconds.
    pub wait_timeout_secs: u64,
}

impl Default for AlgodConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4001".to_string(),
            token: "a".repeat(64),
            rpc_timeout_secs: 10,
            wait_timeout_secs: 70,
        }
    }
}

/// Key daemon (`kmd`) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KmdConfig {
    /// REST endpoint URL.
    pub url: String,

    /// API token sent in `X-KMD-API-Token`.
    pub token: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for KmdConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4002".to_string(),
            token: "a".repeat(64),
            rpc_timeout_secs: 10,
        }
    }
}

/// Wallet and mnemonic the HTTP surface signs with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Name of the key daemon wallet that receives ephemeral keys.
    pub wallet_name: String,

    /// Wallet password.
    pub wallet_password: String,

    /// Environment variable holding the 25-word account mnemonic.
    pub mnemonic_env: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            wallet_name: "unencrypted-default-wallet".to_string(),
            wallet_password: String::new(),
            mnemonic_env: "ASSET_MANAGER_MNEMONIC".to_string(),
        }
    }
}

/// Confirmation wait configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Deadline for a run's confirmation wait in seconds.
    pub timeout_secs: u64,

    /// Base delay before re-polling after a failed status query, in
    /// milliseconds. Zero re-polls immediately.
    pub query_retry_base_ms: u64,

    /// Cap for the re-poll delay in milliseconds.
    pub query_retry_max_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            query_retry_base_ms: 50,
            query_retry_max_ms: 1000,
        }
    }
}

/// Asset registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// JSON file backing the registry. Empty keeps it in memory only.
    pub path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: "assets.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
