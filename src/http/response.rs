//! Response bodies and error mapping.
//!
//! # Responsibilities
//! - Shape success bodies of the asset endpoints
//! - Map run failures to HTTP status codes
//! - Carry the transaction id of broadcast-but-failed runs to the client
//!
//! # Design Decisions
//! - Error body is `{error, message, txHash?}` where `error` is the kind
//! - Upstream (node, daemon) failures are 502, deadline expiry is 504

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::assets::{AssetError, ErrorKind};
use crate::blockchain::TxId;
use crate::http::request::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyResponse {
    pub tx_hash: TxId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetListResponse {
    pub address: String,
    pub asset_ids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub algod: bool,
    pub kmd: bool,
}

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxId>,
}

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: &str, message: String, tx_hash: Option<TxId>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.to_string(),
                message,
                tx_hash,
            },
        }
    }

    /// A run that ended without reporting (task panicked or was aborted).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message.into(), None)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::Build | ErrorKind::Signing => StatusCode::BAD_REQUEST,
        ErrorKind::Wallet
        | ErrorKind::Broadcast
        | ErrorKind::NodeQuery
        | ErrorKind::Discovery => StatusCode::BAD_GATEWAY,
        ErrorKind::ConfirmationTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        let kind = err.kind();
        Self::new(
            status_for(kind),
            kind.as_str(),
            err.to_string(),
            err.tx_id().cloned(),
        )
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let kind = ErrorKind::Validation;
        Self::new(status_for(kind), kind.as_str(), err.to_string(), None)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            rejection.status(),
            ErrorKind::Validation.as_str(),
            rejection.body_text(),
            None,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
