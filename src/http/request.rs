//! Inbound request bodies and their validation.
//!
//! # Responsibilities
//! - Deserialize the JSON bodies of the asset endpoints (camelCase)
//! - Reject malformed input before it reaches the orchestrator
//! - Extract the request ID set by the request-id layer
//!
//! # Design Decisions
//! - Syntax of addresses is checked here; protocol bounds (name lengths,
//!   decimals) are the transaction builder's job
//! - Empty strings mean "not set", matching the web client

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::assets::AssetSpec;
use crate::blockchain::Address;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID of an inbound request, or `unknown`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Input rejected before any external call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is not a valid address: {reason}")]
    Address { field: &'static str, reason: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("malformed request body: {0}")]
    Body(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetCreateRequest {
    pub creator_addr: String,
    pub asset_name: String,
    pub unit_name: String,
    pub total_issuance: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub url: String,
    pub metadata_hash: String,
    pub manager_addr: String,
    pub reserve_addr: String,
    pub freeze_addr: String,
    pub clawback_addr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetDestroyRequest {
    pub asset_id: u64,
    pub manager_addr: String,
}

fn check_address(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    value
        .parse::<Address>()
        .map(|_| ())
        .map_err(|e| ValidationError::Address {
            field,
            reason: e.to_string(),
        })
}

impl TryFrom<AssetCreateRequest> for AssetSpec {
    type Error = ValidationError;

    fn try_from(req: AssetCreateRequest) -> Result<Self, Self::Error> {
        check_address("creatorAddr", &req.creator_addr)?;
        check_address("managerAddr", &req.manager_addr)?;
        check_address("reserveAddr", &req.reserve_addr)?;
        check_address("freezeAddr", &req.freeze_addr)?;
        check_address("clawbackAddr", &req.clawback_addr)?;
        if req.total_issuance == 0 {
            return Err(ValidationError::Zero("totalIssuance"));
        }

        Ok(AssetSpec {
            creator: Some(req.creator_addr).filter(|a| !a.is_empty()),
            asset_name: req.asset_name,
            unit_name: req.unit_name,
            total_issuance: req.total_issuance,
            decimals: req.decimals,
            default_frozen: req.default_frozen,
            url: req.url,
            metadata_hash: req.metadata_hash,
            manager: req.manager_addr,
            reserve: req.reserve_addr,
            freeze: req.freeze_addr,
            clawback: req.clawback_addr,
        })
    }
}

impl AssetDestroyRequest {
    /// Validated asset id and optional manager address.
    pub fn into_parts(self) -> Result<(u64, Option<String>), ValidationError> {
        if self.asset_id == 0 {
            return Err(ValidationError::Zero("assetId"));
        }
        check_address("managerAddr", &self.manager_addr)?;
        Ok((
            self.asset_id,
            Some(self.manager_addr).filter(|a| !a.is_empty()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> AssetCreateRequest {
        AssetCreateRequest {
            asset_name: "Gold".to_string(),
            unit_name: "GLD".to_string(),
            total_issuance: 1000,
            decimals: 0,
            manager_addr: Address::from_public_key([5u8; 32]).to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_camel_case_body() {
        let body = r#"{"assetName":"Gold","unitName":"GLD","totalIssuance":5,"defaultFrozen":true}"#;
        let req: AssetCreateRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.asset_name, "Gold");
        assert_eq!(req.total_issuance, 5);
        assert!(req.default_frozen);
        assert_eq!(req.creator_addr, "");
    }

    #[test]
    fn test_create_into_spec() {
        let spec = AssetSpec::try_from(valid_create()).unwrap();
        assert_eq!(spec.creator, None);
        assert_eq!(spec.asset_name, "Gold");
        assert_eq!(spec.manager, Address::from_public_key([5u8; 32]).to_string());
        assert_eq!(spec.reserve, "");
    }

    #[test]
    fn test_create_rejects_bad_address() {
        let mut req = valid_create();
        req.freeze_addr = "NOTANADDRESS".to_string();
        let err = AssetSpec::try_from(req).unwrap_err();
        assert!(matches!(err, ValidationError::Address { field: "freezeAddr", .. }));
    }

    #[test]
    fn test_create_rejects_zero_issuance() {
        let mut req = valid_create();
        req.total_issuance = 0;
        assert_eq!(
            AssetSpec::try_from(req).unwrap_err(),
            ValidationError::Zero("totalIssuance")
        );
    }

    #[test]
    fn test_destroy_parts() {
        let req: AssetDestroyRequest = serde_json::from_str(r#"{"assetId":12}"#).unwrap();
        assert_eq!(req.into_parts().unwrap(), (12, None));

        let req = AssetDestroyRequest {
            asset_id: 0,
            manager_addr: String::new(),
        };
        assert_eq!(req.into_parts().unwrap_err(), ValidationError::Zero("assetId"));
    }

    #[test]
    fn test_request_id_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, "abc-123".parse().unwrap());
        assert_eq!(request_id(&headers), "abc-123");
    }
}
