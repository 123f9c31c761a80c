//! Asset endpoint handlers.
//!
//! Create and destroy runs are spawned on the server's run tracker and
//! awaited; a client that disconnects drops only the wait, never the run,
//! and shutdown drains the tracker before the process exits.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::assets::{AssetSpec, CreatedAsset};
use crate::blockchain::Address;
use crate::http::request::{request_id, AssetCreateRequest, AssetDestroyRequest, ValidationError};
use crate::http::response::{ApiError, AssetListResponse, DestroyResponse, HealthResponse};
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn create_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AssetCreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedAsset>), ApiError> {
    let request_id = request_id(&headers);
    let Json(request) = payload?;
    let spec = AssetSpec::try_from(request)?;

    tracing::info!(
        request_id = %request_id,
        asset_name = %spec.asset_name,
        unit_name = %spec.unit_name,
        "Create asset requested"
    );

    let lifecycle = state.lifecycle.clone();
    let identity = state.identity.clone();
    let deadline = state.shutdown.deadline(state.confirmation_timeout);
    let run = state.runs.spawn(async move { lifecycle.create_asset(spec, &identity, deadline).await });

    match run.await {
        Ok(Ok(created)) => Ok((StatusCode::CREATED, Json(created))),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Create run did not complete");
            Err(ApiError::internal("create run did not complete"))
        }
    }
}

pub async fn destroy_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AssetDestroyRequest>, JsonRejection>,
) -> Result<Json<DestroyResponse>, ApiError> {
    let request_id = request_id(&headers);
    let Json(request) = payload?;
    let (asset_id, manager) = request.into_parts()?;

    tracing::info!(request_id = %request_id, asset_id, "Destroy asset requested");

    let lifecycle = state.lifecycle.clone();
    let identity = state.identity.clone();
    let deadline = state.shutdown.deadline(state.confirmation_timeout);
    let run = state.runs.spawn(async move {
        lifecycle
            .destroy_asset(asset_id, manager, &identity, deadline)
            .await
    });

    match run.await {
        Ok(Ok(tx_hash)) => Ok(Json(DestroyResponse { tx_hash })),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Destroy run did not complete");
            Err(ApiError::internal("destroy run did not complete"))
        }
    }
}

pub async fn list_assets(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AssetListResponse>, ApiError> {
    let owner = address
        .parse::<Address>()
        .map_err(|e| ValidationError::Address {
            field: "address",
            reason: e.to_string(),
        })?;

    let asset_ids = state.lifecycle.registry().assets_for(&owner);
    Ok(Json(AssetListResponse { address, asset_ids }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let algod = state.lifecycle.node().is_healthy().await;
    let kmd = state.daemon.list_wallets().await.is_ok();
    metrics::record_dependency_health("kmd", kmd);

    let (status, label) = if algod && kmd {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            algod,
            kmd,
        }),
    )
}
