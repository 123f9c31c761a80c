//! Asset configuration transaction building and encoding.
//!
//! # Responsibilities
//! - Validate asset parameters against protocol bounds
//! - Derive the valid round window and fee from network params
//! - Produce the canonical encoding used for signing and transaction ids
//!
//! Encoding is MessagePack with keys in lexical order and empty fields
//! omitted. Building is pure: no I/O happens here.

use serde::Serialize;
use serde_bytes::Bytes;
use sha2::{Digest, Sha512_256};
use thiserror::Error;

use data_encoding::BASE32_NOPAD;

use crate::assets::types::AssetSpec;
use crate::blockchain::address::{Address, AddressError};
use crate::blockchain::types::{NetworkParams, TxId};

pub const MAX_DECIMALS: u32 = 19;
pub const MAX_ASSET_NAME_BYTES: usize = 32;
pub const MAX_UNIT_NAME_BYTES: usize = 8;
pub const MAX_URL_BYTES: usize = 96;
pub const METADATA_HASH_BYTES: usize = 32;

const TXN_DOMAIN: &[u8] = b"TX";
const ASSET_CONFIG_TYPE: &str = "acfg";

/// Errors raised when transaction parameters violate the encoding's bounds.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("transaction has no sender address")]
    MissingSender,

    #[error("invalid {field} address: {source}")]
    InvalidAddress {
        field: &'static str,
        source: AddressError,
    },

    #[error("{field} is {actual} bytes, maximum is {max}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("decimals {0} exceeds maximum of 19")]
    Decimals(u32),

    #[error("asset id must be non-zero")]
    ZeroAssetId,

    #[error("encoding failed: {0}")]
    Encoding(String),
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Parameters of a new asset, validated and ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetParams {
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: String,
    pub asset_name: String,
    pub url: String,
    pub metadata_hash: Option<[u8; METADATA_HASH_BYTES]>,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

/// What an asset configuration transaction does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnKind {
    CreateAsset(AssetParams),
    DestroyAsset { asset_id: u64 },
}

/// An unsigned asset configuration transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTxn {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub kind: TxnKind,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_empty(s: &&str) -> bool {
    s.is_empty()
}

#[derive(Serialize)]
struct WireAssetParams<'a> {
    #[serde(rename = "am", skip_serializing_if = "Option::is_none")]
    metadata_hash: Option<&'a Bytes>,
    #[serde(rename = "an", skip_serializing_if = "is_empty")]
    asset_name: &'a str,
    #[serde(rename = "au", skip_serializing_if = "is_empty")]
    url: &'a str,
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    clawback: Option<&'a Bytes>,
    #[serde(rename = "dc", skip_serializing_if = "is_zero_u32")]
    decimals: u32,
    #[serde(rename = "df", skip_serializing_if = "is_false")]
    default_frozen: bool,
    #[serde(rename = "f", skip_serializing_if = "Option::is_none")]
    freeze: Option<&'a Bytes>,
    #[serde(rename = "m", skip_serializing_if = "Option::is_none")]
    manager: Option<&'a Bytes>,
    #[serde(rename = "r", skip_serializing_if = "Option::is_none")]
    reserve: Option<&'a Bytes>,
    #[serde(rename = "t", skip_serializing_if = "is_zero")]
    total: u64,
    #[serde(rename = "un", skip_serializing_if = "is_empty")]
    unit_name: &'a str,
}

#[derive(Serialize)]
struct WireTxn<'a> {
    #[serde(rename = "apar", skip_serializing_if = "Option::is_none")]
    params: Option<WireAssetParams<'a>>,
    #[serde(rename = "caid", skip_serializing_if = "is_zero")]
    config_asset: u64,
    #[serde(skip_serializing_if = "is_zero")]
    fee: u64,
    #[serde(rename = "fv", skip_serializing_if = "is_zero")]
    first_valid: u64,
    #[serde(rename = "gen", skip_serializing_if = "is_empty")]
    genesis_id: &'a str,
    #[serde(rename = "gh")]
    genesis_hash: &'a Bytes,
    #[serde(rename = "lv", skip_serializing_if = "is_zero")]
    last_valid: u64,
    #[serde(rename = "snd")]
    sender: &'a Bytes,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct WireSignedTxn<'a> {
    sig: &'a Bytes,
    txn: WireTxn<'a>,
}

fn key_bytes(addr: &Option<Address>) -> Option<&Bytes> {
    addr.as_ref().map(|a| Bytes::new(a.public_key()))
}

impl UnsignedTxn {
    fn wire(&self) -> WireTxn<'_> {
        let (params, config_asset) = match &self.kind {
            TxnKind::CreateAsset(p) => (
                Some(WireAssetParams {
                    metadata_hash: p.metadata_hash.as_ref().map(|h| Bytes::new(h)),
                    asset_name: &p.asset_name,
                    url: &p.url,
                    clawback: key_bytes(&p.clawback),
                    decimals: p.decimals,
                    default_frozen: p.default_frozen,
                    freeze: key_bytes(&p.freeze),
                    manager: key_bytes(&p.manager),
                    reserve: key_bytes(&p.reserve),
                    total: p.total,
                    unit_name: &p.unit_name,
                }),
                0,
            ),
            TxnKind::DestroyAsset { asset_id } => (None, *asset_id),
        };
        WireTxn {
            params,
            config_asset,
            fee: self.fee,
            first_valid: self.first_valid,
            genesis_id: &self.genesis_id,
            genesis_hash: Bytes::new(&self.genesis_hash),
            last_valid: self.last_valid,
            sender: Bytes::new(self.sender.public_key()),
            kind: ASSET_CONFIG_TYPE,
        }
    }

    /// Canonical encoding of the transaction body.
    pub fn encode(&self) -> BuildResult<Vec<u8>> {
        rmp_serde::to_vec_named(&self.wire()).map_err(|e| BuildError::Encoding(e.to_string()))
    }

    /// Domain-separated bytes covered by the signature and the id.
    pub fn bytes_to_sign(&self) -> BuildResult<Vec<u8>> {
        let body = self.encode()?;
        let mut out = Vec::with_capacity(TXN_DOMAIN.len() + body.len());
        out.extend_from_slice(TXN_DOMAIN);
        out.extend_from_slice(&body);
        Ok(out)
    }

    pub fn id(&self) -> BuildResult<TxId> {
        let digest = Sha512_256::digest(self.bytes_to_sign()?);
        Ok(TxId(BASE32_NOPAD.encode(&digest)))
    }

    /// Encode the transaction wrapped with its signature.
    pub fn encode_signed(&self, signature: &[u8; 64]) -> BuildResult<Vec<u8>> {
        let signed = WireSignedTxn {
            sig: Bytes::new(signature),
            txn: self.wire(),
        };
        rmp_serde::to_vec_named(&signed).map_err(|e| BuildError::Encoding(e.to_string()))
    }

    pub fn valid_rounds(&self) -> std::ops::Range<u64> {
        self.first_valid..self.last_valid
    }

    /// Set the fee from the per-byte rate and the signed size, floored at the
    /// network minimum.
    fn apply_fee(mut self, params: &NetworkParams) -> BuildResult<Self> {
        self.fee = params.fee_per_byte;
        let size = self.encode_signed(&[0u8; 64])?.len() as u64;
        self.fee = params
            .fee_per_byte
            .saturating_mul(size)
            .max(params.min_fee);
        Ok(self)
    }
}

fn parse_required(field: &'static str, value: &str) -> BuildResult<Address> {
    value
        .parse()
        .map_err(|source| BuildError::InvalidAddress { field, source })
}

fn parse_optional(field: &'static str, value: &str) -> BuildResult<Option<Address>> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_required(field, value).map(Some)
}

fn check_len(field: &'static str, value: &str, max: usize) -> BuildResult<()> {
    if value.len() > max {
        return Err(BuildError::TooLong {
            field,
            max,
            actual: value.len(),
        });
    }
    Ok(())
}

fn metadata_hash(value: &str) -> BuildResult<Option<[u8; METADATA_HASH_BYTES]>> {
    if value.is_empty() {
        return Ok(None);
    }
    check_len("metadata hash", value, METADATA_HASH_BYTES)?;
    let mut hash = [0u8; METADATA_HASH_BYTES];
    hash[..value.len()].copy_from_slice(value.as_bytes());
    Ok(Some(hash))
}

/// Build an unsigned asset creation transaction.
pub fn build_create(spec: &AssetSpec, params: &NetworkParams) -> BuildResult<UnsignedTxn> {
    let creator = spec.creator.as_deref().ok_or(BuildError::MissingSender)?;
    let sender = parse_required("creator", creator)?;

    if spec.decimals > MAX_DECIMALS {
        return Err(BuildError::Decimals(spec.decimals));
    }
    check_len("asset name", &spec.asset_name, MAX_ASSET_NAME_BYTES)?;
    check_len("unit name", &spec.unit_name, MAX_UNIT_NAME_BYTES)?;
    check_len("url", &spec.url, MAX_URL_BYTES)?;

    let asset = AssetParams {
        total: spec.total_issuance,
        decimals: spec.decimals,
        default_frozen: spec.default_frozen,
        unit_name: spec.unit_name.clone(),
        asset_name: spec.asset_name.clone(),
        url: spec.url.clone(),
        metadata_hash: metadata_hash(&spec.metadata_hash)?,
        manager: parse_optional("manager", &spec.manager)?,
        reserve: parse_optional("reserve", &spec.reserve)?,
        freeze: parse_optional("freeze", &spec.freeze)?,
        clawback: parse_optional("clawback", &spec.clawback)?,
    };

    tracing::debug!(
        asset_name = %asset.asset_name,
        unit_name = %asset.unit_name,
        first_valid = params.first_valid,
        "Building asset create transaction"
    );

    UnsignedTxn {
        sender,
        fee: 0,
        first_valid: params.first_valid,
        last_valid: params.last_valid,
        genesis_id: params.genesis_id.clone(),
        genesis_hash: params.genesis_hash,
        kind: TxnKind::CreateAsset(asset),
    }
    .apply_fee(params)
}

/// Build an unsigned asset destruction transaction sent by the manager.
pub fn build_destroy(
    asset_id: u64,
    manager: &str,
    params: &NetworkParams,
) -> BuildResult<UnsignedTxn> {
    if asset_id == 0 {
        return Err(BuildError::ZeroAssetId);
    }
    let sender = parse_required("manager", manager)?;

    tracing::debug!(asset_id, first_valid = params.first_valid, "Building asset destroy transaction");

    UnsignedTxn {
        sender,
        fee: 0,
        first_valid: params.first_valid,
        last_valid: params.last_valid,
        genesis_id: params.genesis_id.clone(),
        genesis_hash: params.genesis_hash,
        kind: TxnKind::DestroyAsset { asset_id },
    }
    .apply_fee(params)
}
