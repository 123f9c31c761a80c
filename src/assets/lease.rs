//! Key lease manager.
//!
//! Imports the signing key into a key daemon wallet for one orchestration run
//! and deletes it again afterwards. This is the only code that mutates wallet
//! state.

use std::sync::Arc;

use crate::assets::error::{LeaseError, LeaseResult};
use crate::assets::types::{LeasedKey, SigningIdentity};
use crate::blockchain::{Account, KeyDaemon};
use crate::observability::metrics;

pub struct KeyLeaseManager {
    daemon: Arc<dyn KeyDaemon>,
}

impl KeyLeaseManager {
    pub fn new(daemon: Arc<dyn KeyDaemon>) -> Self {
        Self { daemon }
    }

    /// Resolve the identity's wallet by name and open a handle on it.
    async fn open_wallet(&self, identity: &SigningIdentity) -> LeaseResult<String> {
        let wallets = self.daemon.list_wallets().await.map_err(LeaseError::Handle)?;
        let wallet = wallets
            .into_iter()
            .find(|w| w.name == identity.wallet_name)
            .ok_or_else(|| LeaseError::WalletNotFound(identity.wallet_name.clone()))?;

        self.daemon
            .init_wallet_handle(&wallet.id, &identity.wallet_password)
            .await
            .map_err(LeaseError::Handle)
    }

    /// Import the identity's key into its wallet.
    ///
    /// On error nothing is left in the daemon that needs releasing.
    pub async fn acquire(&self, identity: &SigningIdentity) -> LeaseResult<LeasedKey> {
        let account = Account::from_mnemonic(&identity.mnemonic)?;
        let expected = account.address();
        let handle = self.open_wallet(identity).await?;

        let imported = self
            .daemon
            .import_key(&handle, &account.private_key())
            .await
            .map_err(LeaseError::KeyImport)?;

        if imported != expected.to_string() {
            tracing::error!(
                expected = %expected,
                imported = %imported,
                "Key daemon derived an unexpected address"
            );
            if let Err(e) = self
                .daemon
                .delete_key(&handle, &identity.wallet_password, &imported)
                .await
            {
                tracing::warn!(address = %imported, error = %e, "Failed to remove mismatched key");
                metrics::record_release_failure();
            }
            return Err(LeaseError::AddressMismatch {
                expected,
                actual: imported,
            });
        }

        metrics::record_key_lease("acquired");
        tracing::debug!(address = %expected, wallet = %identity.wallet_name, "Key leased");
        Ok(LeasedKey::new(handle, account))
    }

    /// Delete the leased key from the daemon.
    ///
    /// A fresh handle is opened because the one from `acquire` may have
    /// expired during a long confirmation wait; the lease's own handle is
    /// the fallback.
    pub async fn release(&self, identity: &SigningIdentity, lease: LeasedKey) -> LeaseResult<()> {
        let address = lease.address();
        let handle = match self.open_wallet(identity).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::debug!(error = %e, "Reopening wallet failed, using lease handle");
                lease.wallet_handle.clone()
            }
        };

        self.daemon
            .delete_key(&handle, &identity.wallet_password, &address.to_string())
            .await
            .map_err(LeaseError::Release)?;

        metrics::record_key_lease("released");
        tracing::debug!(address = %address, "Key released");
        Ok(())
    }
}
