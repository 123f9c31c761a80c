//! Confirmation waiter.
//!
//! # States
//! ```text
//! POLLING ──confirmed round > 0──▶ CONFIRMED
//!    │
//!    ├──pool error / status failure──▶ NODE_ERROR
//!    └──deadline / shutdown──▶ TIMEOUT / CANCELLED
//! ```
//!
//! A failed pending-status query is transient and re-polled after a jittered
//! backoff. Between polls the waiter blocks on the node until the next round.

use std::sync::Arc;

use crate::assets::error::{AssetError, AssetResult};
use crate::assets::types::ConfirmationResult;
use crate::blockchain::{LedgerNode, TxId};
use crate::config::schema::ConfirmationConfig;
use crate::observability::metrics;
use crate::resilience::{calculate_backoff, Deadline, Interrupted};

pub struct ConfirmationWaiter {
    node: Arc<dyn LedgerNode>,
    retry_base_ms: u64,
    retry_max_ms: u64,
}

fn interrupted(reason: Interrupted, tx_id: &TxId) -> AssetError {
    let tx_id = tx_id.clone();
    match reason {
        Interrupted::Elapsed => AssetError::ConfirmationTimeout { tx_id },
        Interrupted::Cancelled => AssetError::Cancelled { tx_id },
    }
}

impl ConfirmationWaiter {
    pub fn new(node: Arc<dyn LedgerNode>, config: &ConfirmationConfig) -> Self {
        Self {
            node,
            retry_base_ms: config.query_retry_base_ms,
            retry_max_ms: config.query_retry_max_ms,
        }
    }

    /// Poll until `tx_id` is confirmed, the node reports it failed, or the
    /// deadline interrupts.
    pub async fn await_confirmation(
        &self,
        tx_id: &TxId,
        deadline: &mut Deadline,
    ) -> AssetResult<ConfirmationResult> {
        let mut failures: u32 = 0;

        loop {
            let queried = deadline
                .run(self.node.pending_transaction(tx_id))
                .await
                .map_err(|i| interrupted(i, tx_id))?;

            let pending = match queried {
                Ok(pending) => {
                    failures = 0;
                    pending
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    metrics::record_confirmation_poll("error");
                    tracing::warn!(
                        tx_id = %tx_id,
                        attempt = failures,
                        error = %e,
                        "Pending transaction query failed, re-polling"
                    );
                    let delay = calculate_backoff(failures, self.retry_base_ms, self.retry_max_ms);
                    deadline
                        .sleep(delay)
                        .await
                        .map_err(|i| interrupted(i, tx_id))?;
                    continue;
                }
            };

            if !pending.pool_error.is_empty() {
                metrics::record_confirmation_poll("rejected");
                tracing::error!(tx_id = %tx_id, pool_error = %pending.pool_error, "Transaction dropped");
                return Err(AssetError::PoolRejected {
                    tx_id: tx_id.clone(),
                    message: pending.pool_error,
                });
            }

            if pending.confirmed_round > 0 {
                metrics::record_confirmation_poll("confirmed");
                tracing::info!(
                    tx_id = %tx_id,
                    round = pending.confirmed_round,
                    "Transaction confirmed"
                );
                return Ok(ConfirmationResult {
                    confirmed_round: pending.confirmed_round,
                    tx_id: tx_id.clone(),
                    asset_index: pending.asset_index,
                });
            }

            metrics::record_confirmation_poll("pending");
            let status = deadline
                .run(self.node.status())
                .await
                .map_err(|i| interrupted(i, tx_id))?
                .map_err(|source| AssetError::NodeQuery {
                    tx_id: tx_id.clone(),
                    source,
                })?;

            tracing::debug!(tx_id = %tx_id, last_round = status.last_round, "Waiting for next round");
            deadline
                .run(self.node.wait_for_round(status.last_round.saturating_add(1)))
                .await
                .map_err(|i| interrupted(i, tx_id))?
                .map_err(|source| AssetError::NodeQuery {
                    tx_id: tx_id.clone(),
                    source,
                })?;
        }
    }
}
