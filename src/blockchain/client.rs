//! Ledger node (`algod`) REST client with timeout and error handling.
//!
//! # Responsibilities
//! - Fetch suggested transaction parameters
//! - Broadcast signed transactions as raw bytes
//! - Query pending transactions, node status and account state
//! - Block until the node reaches a round (long poll)

use async_trait::async_trait;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::address::Address;
use crate::blockchain::types::{
    AccountInfo, AlgodConfig, BlockchainError, BlockchainResult, NetworkParams, NodeStatus,
    PendingTransaction, TxId,
};

const TOKEN_HEADER: &str = "X-Algo-API-Token";
const SERVICE: &str = "algod";

/// Operations the asset lifecycle needs from a ledger node.
#[async_trait]
pub trait LedgerNode: Send + Sync {
    /// Current fee and round parameters for a new transaction.
    async fn suggested_params(&self) -> BlockchainResult<NetworkParams>;

    /// Submit raw signed transaction bytes; returns the node's transaction id.
    async fn broadcast(&self, signed: &[u8]) -> BlockchainResult<TxId>;

    async fn pending_transaction(&self, tx_id: &TxId) -> BlockchainResult<PendingTransaction>;

    async fn status(&self) -> BlockchainResult<NodeStatus>;

    /// Block until the node has seen a round after `round`.
    async fn wait_for_round(&self, round: u64) -> BlockchainResult<NodeStatus>;

    async fn account_information(&self, address: &Address) -> BlockchainResult<AccountInfo>;

    async fn is_healthy(&self) -> bool {
        self.status().await.is_ok()
    }
}

#[derive(Deserialize)]
struct ParamsResponse {
    fee: u64,
    #[serde(rename = "min-fee")]
    min_fee: u64,
    #[serde(rename = "last-round")]
    last_round: u64,
    #[serde(rename = "genesis-id")]
    genesis_id: String,
    #[serde(rename = "genesis-hash")]
    genesis_hash: String,
}

#[derive(Deserialize)]
struct BroadcastResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

#[derive(Deserialize)]
struct PendingResponse {
    #[serde(rename = "confirmed-round", default)]
    confirmed_round: u64,
    #[serde(rename = "pool-error", default)]
    pool_error: String,
    #[serde(rename = "asset-index", default)]
    asset_index: Option<u64>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(rename = "last-round")]
    last_round: u64,
}

#[derive(Deserialize)]
struct CreatedAsset {
    index: u64,
}

#[derive(Deserialize)]
struct AccountResponse {
    address: String,
    #[serde(rename = "created-assets", default)]
    created_assets: Vec<CreatedAsset>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Normalise a base URL so relative joins keep its path.
pub(crate) fn base_url(raw: &str) -> BlockchainResult<Url> {
    let mut url: Url = raw
        .parse()
        .map_err(|e| BlockchainError::Rpc(format!("Invalid URL '{}': {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Turn a non-success response into a rejection carrying the server message.
pub(crate) async fn rejection(service: &'static str, response: reqwest::Response) -> BlockchainError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    BlockchainError::Rejected {
        service,
        status,
        message,
    }
}

/// REST client for an `algod` node.
#[derive(Clone)]
pub struct AlgodClient {
    http: reqwest::Client,
    base: Url,
    config: AlgodConfig,
    timeout_duration: Duration,
    wait_duration: Duration,
}

impl AlgodClient {
    /// Create a new client. No request is made until the first call.
    pub fn new(config: AlgodConfig) -> BlockchainResult<Self> {
        let base = base_url(&config.url)?;
        tracing::info!(url = %config.url, "Ledger node client initialized");
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            wait_duration: Duration::from_secs(config.wait_timeout_secs),
            config,
        })
    }

    fn endpoint(&self, path: &str) -> BlockchainResult<Url> {
        self.base
            .join(path)
            .map_err(|e| BlockchainError::Rpc(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        limit: Duration,
    ) -> BlockchainResult<T> {
        let fut = async {
            let response = request
                .header(TOKEN_HEADER, &self.config.token)
                .send()
                .await
                .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
            if !response.status().is_success() {
                return Err(rejection(SERVICE, response).await);
            }
            response
                .json::<T>()
                .await
                .map_err(|e| BlockchainError::Decode(e.to_string()))
        };
        match timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(BlockchainError::Timeout(limit.as_secs())),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> BlockchainResult<T> {
        let url = self.endpoint(path)?;
        self.send(self.http.get(url), self.timeout_duration).await
    }

    pub fn config(&self) -> &AlgodConfig {
        &self.config
    }
}

#[async_trait]
impl LedgerNode for AlgodClient {
    async fn suggested_params(&self) -> BlockchainResult<NetworkParams> {
        let params: ParamsResponse = self.get("v2/transactions/params").await?;
        let hash = base64::engine::general_purpose::STANDARD
            .decode(&params.genesis_hash)
            .map_err(|e| BlockchainError::Decode(format!("genesis hash: {}", e)))?;
        let genesis_hash: [u8; 32] = hash
            .try_into()
            .map_err(|_| BlockchainError::Decode("genesis hash must be 32 bytes".to_string()))?;
        Ok(NetworkParams::new(
            params.fee,
            params.min_fee,
            params.last_round,
            params.genesis_id,
            genesis_hash,
        ))
    }

    async fn broadcast(&self, signed: &[u8]) -> BlockchainResult<TxId> {
        let url = self.endpoint("v2/transactions")?;
        let request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(signed.to_vec());
        let response: BroadcastResponse = self.send(request, self.timeout_duration).await?;
        Ok(TxId(response.tx_id))
    }

    async fn pending_transaction(&self, tx_id: &TxId) -> BlockchainResult<PendingTransaction> {
        let pending: PendingResponse = self
            .get(&format!("v2/transactions/pending/{}", tx_id))
            .await?;
        Ok(PendingTransaction {
            confirmed_round: pending.confirmed_round,
            pool_error: pending.pool_error,
            asset_index: pending.asset_index.filter(|id| *id > 0),
        })
    }

    async fn status(&self) -> BlockchainResult<NodeStatus> {
        let status: StatusResponse = self.get("v2/status").await?;
        Ok(NodeStatus {
            last_round: status.last_round,
        })
    }

    async fn wait_for_round(&self, round: u64) -> BlockchainResult<NodeStatus> {
        let url = self.endpoint(&format!("v2/status/wait-for-block-after/{}", round))?;
        let status: StatusResponse = self.send(self.http.get(url), self.wait_duration).await?;
        Ok(NodeStatus {
            last_round: status.last_round,
        })
    }

    async fn account_information(&self, address: &Address) -> BlockchainResult<AccountInfo> {
        let account: AccountResponse = self.get(&format!("v2/accounts/{}", address)).await?;
        Ok(AccountInfo {
            address: account.address,
            created_assets: account.created_assets.into_iter().map(|a| a.index).collect(),
        })
    }

    async fn is_healthy(&self) -> bool {
        let Ok(url) = self.endpoint("health") else {
            return false;
        };
        let request = self.http.get(url).header(TOKEN_HEADER, &self.config.token);
        let healthy = matches!(
            timeout(self.timeout_duration, request.send()).await,
            Ok(Ok(response)) if response.status().is_success()
        );
        crate::observability::metrics::record_dependency_health(SERVICE, healthy);
        healthy
    }
}

impl std::fmt::Debug for AlgodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgodClient")
            .field("url", &self.config.url)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
