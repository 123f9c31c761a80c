//! Asset lifecycle orchestrator.
//!
//! # Data Flow
//! ```text
//! create_asset:
//!     acquire key → fetch params → build create → submit
//!     → await confirmation → discover asset id → release key
//!     → record ownership
//!
//! destroy_asset:
//!     acquire key → fetch params → build destroy → submit
//!     → await confirmation → release key
//! ```
//!
//! Release runs exactly once per successful acquire, after the stages in
//! between finished or failed. Its failure is logged and counted, never
//! returned.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::assets::confirmation::ConfirmationWaiter;
use crate::assets::error::{AssetError, AssetResult};
use crate::assets::lease::KeyLeaseManager;
use crate::assets::registry::AssetRegistry;
use crate::assets::submission::SubmissionPipeline;
use crate::assets::types::{AssetSpec, ConfirmationResult, CreatedAsset, LeasedKey, SigningIdentity};
use crate::blockchain::transaction::{build_create, build_destroy};
use crate::blockchain::{Address, KeyDaemon, LedgerNode, TxId};
use crate::config::schema::ConfirmationConfig;
use crate::observability::metrics;
use crate::resilience::{Deadline, Interrupted};

/// Public contract used by the HTTP handlers.
pub struct AssetLifecycle {
    node: Arc<dyn LedgerNode>,
    leases: KeyLeaseManager,
    submission: SubmissionPipeline,
    waiter: ConfirmationWaiter,
    registry: Arc<dyn AssetRegistry>,
}

fn outcome<T>(result: &AssetResult<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.kind().as_str(),
    }
}

fn log_failure(err: &AssetError) {
    match err.tx_id() {
        Some(tx_id) => tracing::error!(
            kind = %err.kind(),
            tx_id = %tx_id,
            error = %err,
            "Run failed after broadcast"
        ),
        None => tracing::warn!(kind = %err.kind(), error = %err, "Run failed"),
    }
}

impl AssetLifecycle {
    pub fn new(
        node: Arc<dyn LedgerNode>,
        daemon: Arc<dyn KeyDaemon>,
        registry: Arc<dyn AssetRegistry>,
        confirmation: &ConfirmationConfig,
    ) -> Self {
        Self {
            leases: KeyLeaseManager::new(daemon),
            submission: SubmissionPipeline::new(node.clone()),
            waiter: ConfirmationWaiter::new(node.clone(), confirmation),
            node,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<dyn AssetRegistry> {
        &self.registry
    }

    pub fn node(&self) -> &Arc<dyn LedgerNode> {
        &self.node
    }

    /// Create an asset and record it against its creator.
    ///
    /// A `spec.creator` of `None` uses the leased address.
    pub async fn create_asset(
        &self,
        spec: AssetSpec,
        identity: &SigningIdentity,
        mut deadline: Deadline,
    ) -> AssetResult<CreatedAsset> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("create_asset", %run_id, asset_name = %spec.asset_name);
        let start = Instant::now();

        let result = self
            .run_create(spec, identity, &mut deadline)
            .instrument(span)
            .await;

        metrics::record_orchestration("create", outcome(&result), start);
        result
    }

    /// Destroy `asset_id`, signing as `manager` (the leased address when
    /// `None`). Returns the id of the confirmed destroy transaction.
    pub async fn destroy_asset(
        &self,
        asset_id: u64,
        manager: Option<String>,
        identity: &SigningIdentity,
        mut deadline: Deadline,
    ) -> AssetResult<TxId> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("destroy_asset", %run_id, asset_id);
        let start = Instant::now();

        let result = self
            .run_destroy(asset_id, manager, identity, &mut deadline)
            .instrument(span)
            .await;

        metrics::record_orchestration("destroy", outcome(&result), start);
        result
    }

    async fn run_create(
        &self,
        mut spec: AssetSpec,
        identity: &SigningIdentity,
        deadline: &mut Deadline,
    ) -> AssetResult<CreatedAsset> {
        let lease = self.leases.acquire(identity).await?;
        if spec.creator.as_deref().map_or(true, str::is_empty) {
            spec.creator = Some(lease.address().to_string());
        }

        let staged = self.create_stages(&spec, &lease, deadline).await;
        self.release(identity, lease).await;

        let (owner, tx_id, asset_id) = staged.inspect_err(log_failure)?;

        self.registry
            .record_asset(&owner, asset_id)
            .map_err(|source| AssetError::Persistence {
                tx_id: tx_id.clone(),
                asset_id,
                source,
            })
            .inspect_err(log_failure)?;

        tracing::info!(asset_id, tx_id = %tx_id, owner = %owner, "Asset created");
        Ok(CreatedAsset { asset_id, tx_id })
    }

    async fn create_stages(
        &self,
        spec: &AssetSpec,
        lease: &LeasedKey,
        deadline: &mut Deadline,
    ) -> AssetResult<(Address, TxId, u64)> {
        let params = self
            .node
            .suggested_params()
            .await
            .map_err(AssetError::Params)?;
        let txn = build_create(spec, &params)?;
        let tx_id = self.submission.submit(&txn, lease).await?;
        let confirmation = self.waiter.await_confirmation(&tx_id, deadline).await?;
        let asset_id = self
            .discover_asset_id(&confirmation, &txn.sender, deadline)
            .await?;
        Ok((txn.sender, tx_id, asset_id))
    }

    async fn run_destroy(
        &self,
        asset_id: u64,
        manager: Option<String>,
        identity: &SigningIdentity,
        deadline: &mut Deadline,
    ) -> AssetResult<TxId> {
        let lease = self.leases.acquire(identity).await?;
        let manager = manager
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| lease.address().to_string());

        let staged = self
            .destroy_stages(asset_id, &manager, &lease, deadline)
            .await;
        self.release(identity, lease).await;

        let tx_id = staged.inspect_err(log_failure)?;
        tracing::info!(asset_id, tx_id = %tx_id, "Asset destroyed");
        Ok(tx_id)
    }

    async fn destroy_stages(
        &self,
        asset_id: u64,
        manager: &str,
        lease: &LeasedKey,
        deadline: &mut Deadline,
    ) -> AssetResult<TxId> {
        let params = self
            .node
            .suggested_params()
            .await
            .map_err(AssetError::Params)?;
        let txn = build_destroy(asset_id, manager, &params)?;
        let tx_id = self.submission.submit(&txn, lease).await?;
        self.waiter.await_confirmation(&tx_id, deadline).await?;
        Ok(tx_id)
    }

    /// Prefer the index the node reports for the confirmed transaction; fall
    /// back to the highest asset the creator has created.
    async fn discover_asset_id(
        &self,
        confirmation: &ConfirmationResult,
        creator: &Address,
        deadline: &mut Deadline,
    ) -> AssetResult<u64> {
        if let Some(asset_id) = confirmation.asset_index {
            return Ok(asset_id);
        }

        let discovery = |reason: String| AssetError::Discovery {
            tx_id: confirmation.tx_id.clone(),
            reason,
        };

        tracing::warn!(
            tx_id = %confirmation.tx_id,
            creator = %creator,
            "Node did not report an asset index, reading creator account"
        );
        let account = deadline
            .run(self.node.account_information(creator))
            .await
            .map_err(|i| match i {
                Interrupted::Elapsed => discovery("deadline expired during account lookup".to_string()),
                Interrupted::Cancelled => discovery("cancelled during account lookup".to_string()),
            })?
            .map_err(|e| discovery(e.to_string()))?;

        account
            .created_assets
            .into_iter()
            .max()
            .ok_or_else(|| discovery("creator account holds no created assets".to_string()))
    }

    async fn release(&self, identity: &SigningIdentity, lease: LeasedKey) {
        let address = lease.address();
        if let Err(e) = self.leases.release(identity, lease).await {
            metrics::record_release_failure();
            tracing::error!(address = %address, error = %e, "Ephemeral key left in key daemon");
        }
    }
}
