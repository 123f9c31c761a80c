//! Key daemon (`kmd`) REST client.
//!
//! The daemon stores private keys in password-protected wallets. Every
//! operation on a wallet goes through a short-lived handle token obtained
//! with the wallet password.

use async_trait::async_trait;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::client::{base_url, rejection};
use crate::blockchain::types::{BlockchainError, BlockchainResult, KmdConfig, WalletSummary};

const TOKEN_HEADER: &str = "X-KMD-API-Token";
const SERVICE: &str = "kmd";

/// Operations the key lease manager needs from a key daemon.
#[async_trait]
pub trait KeyDaemon: Send + Sync {
    async fn list_wallets(&self) -> BlockchainResult<Vec<WalletSummary>>;

    /// Open a wallet handle; returns the handle token.
    async fn init_wallet_handle(&self, wallet_id: &str, password: &str) -> BlockchainResult<String>;

    /// Import a 64-byte private key; returns the address the daemon derived.
    async fn import_key(&self, handle: &str, private_key: &[u8; 64]) -> BlockchainResult<String>;

    async fn delete_key(&self, handle: &str, password: &str, address: &str) -> BlockchainResult<()>;
}

#[derive(Deserialize)]
struct ListWalletsResponse {
    #[serde(default)]
    wallets: Vec<WalletSummary>,
}

#[derive(Serialize)]
struct InitHandleRequest<'a> {
    wallet_id: &'a str,
    wallet_password: &'a str,
}

#[derive(Deserialize)]
struct InitHandleResponse {
    wallet_handle_token: String,
}

#[derive(Serialize)]
struct ImportKeyRequest<'a> {
    wallet_handle_token: &'a str,
    private_key: String,
}

#[derive(Deserialize)]
struct ImportKeyResponse {
    address: String,
}

#[derive(Serialize)]
struct DeleteKeyRequest<'a> {
    wallet_handle_token: &'a str,
    wallet_password: &'a str,
    address: &'a str,
}

/// REST client for a `kmd` daemon.
#[derive(Clone)]
pub struct KmdClient {
    http: reqwest::Client,
    base: Url,
    config: KmdConfig,
    timeout_duration: Duration,
}

impl KmdClient {
    pub fn new(config: KmdConfig) -> BlockchainResult<Self> {
        let base = base_url(&config.url)?;
        tracing::info!(url = %config.url, "Key daemon client initialized");
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
        })
    }

    /// Send a request and return the raw response body of a success.
    async fn execute(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> BlockchainResult<String> {
        let url = self
            .base
            .join(path)
            .map_err(|e| BlockchainError::Rpc(format!("Invalid endpoint '{}': {}", path, e)))?;
        let mut request = self
            .http
            .request(method, url)
            .header(TOKEN_HEADER, &self.config.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let fut = async {
            let response = request
                .send()
                .await
                .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
            if !response.status().is_success() {
                return Err(rejection(SERVICE, response).await);
            }
            response
                .text()
                .await
                .map_err(|e| BlockchainError::Rpc(e.to_string()))
        };
        match timeout(self.timeout_duration, fut).await {
            Ok(result) => result,
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> BlockchainResult<T> {
        let text = self.execute(method, path, body).await?;
        serde_json::from_str(&text).map_err(|e| BlockchainError::Decode(e.to_string()))
    }

    pub fn config(&self) -> &KmdConfig {
        &self.config
    }
}

fn to_value<T: Serialize>(body: &T) -> BlockchainResult<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| BlockchainError::Decode(e.to_string()))
}

#[async_trait]
impl KeyDaemon for KmdClient {
    async fn list_wallets(&self) -> BlockchainResult<Vec<WalletSummary>> {
        let response: ListWalletsResponse = self.call(reqwest::Method::GET, "v1/wallets", None).await?;
        Ok(response.wallets)
    }

    async fn init_wallet_handle(&self, wallet_id: &str, password: &str) -> BlockchainResult<String> {
        let body = to_value(&InitHandleRequest {
            wallet_id,
            wallet_password: password,
        })?;
        let response: InitHandleResponse = self
            .call(reqwest::Method::POST, "v1/wallet/init", Some(body))
            .await?;
        Ok(response.wallet_handle_token)
    }

    async fn import_key(&self, handle: &str, private_key: &[u8; 64]) -> BlockchainResult<String> {
        let body = to_value(&ImportKeyRequest {
            wallet_handle_token: handle,
            private_key: base64::engine::general_purpose::STANDARD.encode(private_key),
        })?;
        let response: ImportKeyResponse = self
            .call(reqwest::Method::POST, "v1/key/import", Some(body))
            .await?;
        Ok(response.address)
    }

    async fn delete_key(&self, handle: &str, password: &str, address: &str) -> BlockchainResult<()> {
        let body = to_value(&DeleteKeyRequest {
            wallet_handle_token: handle,
            wallet_password: password,
            address,
        })?;
        // The daemon answers with an empty object; the body is not needed.
        self.execute(reqwest::Method::DELETE, "v1/key", Some(body))
            .await
            .map(|_| ())
    }
}

impl std::fmt::Debug for KmdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KmdClient")
            .field("url", &self.config.url)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_list_decoding() {
        let body = r#"{"wallets":[{"id":"abc","name":"unencrypted-default-wallet","driver_name":"sqlite"}]}"#;
        let parsed: ListWalletsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.wallets.len(), 1);
        assert_eq!(parsed.wallets[0].name, "unencrypted-default-wallet");

        let empty: ListWalletsResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.wallets.is_empty());
    }

    #[test]
    fn test_import_request_encodes_key() {
        let key = [1u8; 64];
        let body = to_value(&ImportKeyRequest {
            wallet_handle_token: "h",
            private_key: base64::engine::general_purpose::STANDARD.encode(key),
        })
        .unwrap();
        let encoded = body["private_key"].as_str().unwrap();
        let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, key.to_vec());
    }

    #[tokio::test]
    async fn test_unreachable_daemon() {
        let client = KmdClient::new(KmdConfig {
            url: "http://127.0.0.1:9".to_string(),
            token: "a".repeat(64),
            rpc_timeout_secs: 2,
        })
        .unwrap();
        assert!(client.list_wallets().await.is_err());
    }
}
