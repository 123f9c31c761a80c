//! Submission pipeline: local signing and broadcast.

use std::sync::Arc;

use crate::assets::error::{AssetError, AssetResult};
use crate::assets::types::LeasedKey;
use crate::blockchain::transaction::UnsignedTxn;
use crate::blockchain::{LedgerNode, TxId};

pub struct SubmissionPipeline {
    node: Arc<dyn LedgerNode>,
}

impl SubmissionPipeline {
    pub fn new(node: Arc<dyn LedgerNode>) -> Self {
        Self { node }
    }

    /// Sign `txn` with the leased key and broadcast it.
    ///
    /// Returns the id the node reports. Once this returns `Ok` the
    /// transaction cannot be withdrawn.
    pub async fn submit(&self, txn: &UnsignedTxn, lease: &LeasedKey) -> AssetResult<TxId> {
        let signed = lease.account().sign_transaction(txn)?;

        let tx_id = self
            .node
            .broadcast(&signed.bytes)
            .await
            .map_err(AssetError::Broadcast)?;

        if tx_id != signed.tx_id {
            tracing::warn!(
                local_tx_id = %signed.tx_id,
                tx_id = %tx_id,
                "Node reported a different transaction id"
            );
        }
        tracing::info!(
            tx_id = %tx_id,
            sender = %signed.sender,
            bytes = signed.bytes.len(),
            "Transaction broadcast"
        );
        Ok(tx_id)
    }
}
