//! REST clients against mock `algod` and `kmd` servers.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use base64::Engine as _;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use asset_manager::assets::{AssetLifecycle, AssetRegistry, MemoryRegistry};
use asset_manager::blockchain::types::{AlgodConfig, BlockchainError, KmdConfig};
use asset_manager::blockchain::{Address, AlgodClient, KeyDaemon, KmdClient, LedgerNode, TxId};

mod common;
use common::{asset_spec, confirmation_config, deadline, test_account, test_identity};

const TOKEN: &str = "mock-token";
const GENESIS_HASH: [u8; 32] = [3u8; 32];

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn authorized(headers: &HeaderMap, name: &str) -> bool {
    headers.get(name).and_then(|v| v.to_str().ok()) == Some(TOKEN)
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Invalid API Token"})),
    )
}

async fn start_algod() -> SocketAddr {
    let router = Router::new()
        .route(
            "/v2/transactions/params",
            get(|headers: HeaderMap| async move {
                if !authorized(&headers, "X-Algo-API-Token") {
                    return unauthorized();
                }
                let hash = base64::engine::general_purpose::STANDARD.encode(GENESIS_HASH);
                (
                    StatusCode::OK,
                    Json(json!({
                        "consensus-version": "future",
                        "fee": 0,
                        "min-fee": 1000,
                        "last-round": 500,
                        "genesis-id": "testnet-v1.0",
                        "genesis-hash": hash
                    })),
                )
            }),
        )
        .route(
            "/v2/transactions",
            post(|headers: HeaderMap, body: Bytes| async move {
                let binary = headers
                    .get("content-type")
                    .is_some_and(|v| v == "application/x-binary");
                if !binary || body.is_empty() {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"message": "expected raw transaction bytes"})),
                    );
                }
                if body.as_ref() == b"overspend" {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"message": "TransactionPool.Remember: overspend"})),
                    );
                }
                (StatusCode::OK, Json(json!({"txId": "MOCKTXID"})))
            }),
        )
        .route(
            "/v2/transactions/pending/{txid}",
            get(|Path(txid): Path<String>| async move {
                Json(json!({
                    "confirmed-round": if txid == "MOCKTXID" { 501 } else { 0 },
                    "pool-error": "",
                    "asset-index": 77
                }))
            }),
        )
        .route("/v2/status", get(|| async { Json(json!({"last-round": 500})) }))
        .route(
            "/v2/status/wait-for-block-after/{round}",
            get(|Path(round): Path<u64>| async move { Json(json!({"last-round": round})) }),
        )
        .route(
            "/v2/accounts/{address}",
            get(|Path(address): Path<String>| async move {
                Json(json!({
                    "address": address,
                    "amount": 10_000_000,
                    "created-assets": [
                        {"index": 3, "params": {"total": 10}},
                        {"index": 9, "params": {"total": 20}}
                    ]
                }))
            }),
        )
        .route("/health", get(|| async { StatusCode::OK }));
    serve(router).await
}

fn algod_client(addr: SocketAddr) -> AlgodClient {
    AlgodClient::new(AlgodConfig {
        url: format!("http://{}", addr),
        token: TOKEN.to_string(),
        rpc_timeout_secs: 5,
        wait_timeout_secs: 5,
    })
    .unwrap()
}

#[derive(Clone, Default)]
struct KmdState {
    deletes: Arc<AtomicU32>,
}

async fn start_kmd(state: KmdState) -> SocketAddr {
    let router = Router::new()
        .route(
            "/v1/wallets",
            get(|headers: HeaderMap| async move {
                if !authorized(&headers, "X-KMD-API-Token") {
                    return unauthorized();
                }
                (
                    StatusCode::OK,
                    Json(json!({"wallets": [
                        {"id": "w-1", "name": common::WALLET_NAME, "driver_name": "sqlite"}
                    ]})),
                )
            }),
        )
        .route(
            "/v1/wallet/init",
            post(|Json(body): Json<Value>| async move {
                if body["wallet_password"] != common::WALLET_PASSWORD {
                    return (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"error": true, "message": "wrong password"})),
                    );
                }
                (
                    StatusCode::OK,
                    Json(json!({"wallet_handle_token": format!("handle-{}", body["wallet_id"].as_str().unwrap_or(""))})),
                )
            }),
        )
        .route(
            "/v1/key/import",
            post(|Json(body): Json<Value>| async move {
                let key = base64::engine::general_purpose::STANDARD
                    .decode(body["private_key"].as_str().unwrap_or(""))
                    .unwrap_or_default();
                if key.len() != 64 {
                    return (StatusCode::BAD_REQUEST, Json(json!({"message": "bad key"})));
                }
                let mut public = [0u8; 32];
                public.copy_from_slice(&key[32..]);
                (
                    StatusCode::OK,
                    Json(json!({"address": Address::from_public_key(public).to_string()})),
                )
            }),
        )
        .route(
            "/v1/key",
            axum::routing::delete(
                |State(state): State<KmdState>, Json(body): Json<Value>| async move {
                    assert!(body["address"].as_str().is_some());
                    state.deletes.fetch_add(1, Ordering::SeqCst);
                    Json(json!({}))
                },
            ),
        )
        .with_state(state);
    serve(router).await
}

fn kmd_client(addr: SocketAddr) -> KmdClient {
    KmdClient::new(KmdConfig {
        url: format!("http://{}", addr),
        token: TOKEN.to_string(),
        rpc_timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_algod_suggested_params() {
    let client = algod_client(start_algod().await);
    let params = client.suggested_params().await.unwrap();
    assert_eq!(params.min_fee, 1000);
    assert_eq!(params.first_valid, 500);
    assert_eq!(params.last_valid, 1500);
    assert_eq!(params.genesis_id, "testnet-v1.0");
    assert_eq!(params.genesis_hash, GENESIS_HASH);
}

#[tokio::test]
async fn test_algod_wrong_token_is_rejection() {
    let addr = start_algod().await;
    let client = AlgodClient::new(AlgodConfig {
        url: format!("http://{}", addr),
        token: "wrong".to_string(),
        rpc_timeout_secs: 5,
        wait_timeout_secs: 5,
    })
    .unwrap();

    match client.suggested_params().await {
        Err(BlockchainError::Rejected { status, message, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API Token");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_algod_broadcast() {
    let client = algod_client(start_algod().await);
    let tx_id = client.broadcast(b"signed-bytes").await.unwrap();
    assert_eq!(tx_id, TxId("MOCKTXID".to_string()));

    let err = client.broadcast(b"overspend").await.unwrap_err();
    assert!(err.is_rejection());
    assert!(err.to_string().contains("overspend"));
}

#[tokio::test]
async fn test_algod_queries() {
    let client = algod_client(start_algod().await);

    let pending = client
        .pending_transaction(&TxId("MOCKTXID".to_string()))
        .await
        .unwrap();
    assert_eq!(pending.confirmed_round, 501);
    assert_eq!(pending.asset_index, Some(77));

    assert_eq!(client.status().await.unwrap().last_round, 500);
    assert_eq!(client.wait_for_round(501).await.unwrap().last_round, 501);

    let account = client
        .account_information(&test_account().address())
        .await
        .unwrap();
    assert_eq!(account.created_assets, vec![3, 9]);
    assert!(client.is_healthy().await);
}

#[tokio::test]
async fn test_kmd_round_trip() {
    let state = KmdState::default();
    let client = kmd_client(start_kmd(state.clone()).await);

    let wallets = client.list_wallets().await.unwrap();
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].name, common::WALLET_NAME);

    let handle = client
        .init_wallet_handle("w-1", common::WALLET_PASSWORD)
        .await
        .unwrap();
    assert_eq!(handle, "handle-w-1");

    let account = test_account();
    let address = client.import_key(&handle, &account.private_key()).await.unwrap();
    assert_eq!(address, account.address().to_string());

    client
        .delete_key(&handle, common::WALLET_PASSWORD, &address)
        .await
        .unwrap();
    assert_eq!(state.deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_kmd_wrong_password() {
    let client = kmd_client(start_kmd(KmdState::default()).await);
    let err = client.init_wallet_handle("w-1", "nope").await.unwrap_err();
    assert!(err.is_rejection());
}

#[tokio::test]
async fn test_create_against_rest_services() {
    let kmd_state = KmdState::default();
    let node: Arc<dyn LedgerNode> = Arc::new(algod_client(start_algod().await));
    let daemon: Arc<dyn KeyDaemon> = Arc::new(kmd_client(start_kmd(kmd_state.clone()).await));
    let registry = Arc::new(MemoryRegistry::new());
    let lifecycle = AssetLifecycle::new(node, daemon, registry.clone(), &confirmation_config());

    let created = lifecycle
        .create_asset(asset_spec(), &test_identity(), deadline())
        .await
        .unwrap();

    assert_eq!(created.asset_id, 77);
    assert_eq!(created.tx_id.as_str(), "MOCKTXID");
    assert_eq!(registry.assets_for(&test_account().address()), vec![77]);
    assert_eq!(kmd_state.deletes.load(Ordering::SeqCst), 1);
}
