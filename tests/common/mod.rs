//! Shared fakes for integration testing.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use asset_manager::assets::{
    AssetLifecycle, AssetRegistry, AssetSpec, MemoryRegistry, RegistryError, SigningIdentity,
};
use asset_manager::blockchain::types::{
    AccountInfo, BlockchainError, BlockchainResult, NetworkParams, NodeStatus, PendingTransaction,
    WalletSummary,
};
use asset_manager::blockchain::{Account, Address, KeyDaemon, LedgerNode, TxId};
use asset_manager::config::schema::ConfirmationConfig;
use asset_manager::resilience::Deadline;

pub const WALLET_NAME: &str = "test-wallet";
pub const WALLET_PASSWORD: &str = "test-password";
pub const START_ROUND: u64 = 1_000;

/// The account every test signs with.
pub fn test_account() -> Account {
    Account::from_seed([9u8; 32])
}

pub fn test_identity() -> SigningIdentity {
    SigningIdentity::new(test_account().mnemonic(), WALLET_NAME, WALLET_PASSWORD)
}

pub fn other_address() -> Address {
    Address::from_public_key([42u8; 32])
}

pub fn asset_spec() -> AssetSpec {
    AssetSpec {
        creator: None,
        asset_name: "Test Token".to_string(),
        unit_name: "TT".to_string(),
        total_issuance: 1_000_000,
        decimals: 2,
        ..Default::default()
    }
}

pub fn confirmation_config() -> ConfirmationConfig {
    ConfirmationConfig {
        timeout_secs: 5,
        query_retry_base_ms: 0,
        query_retry_max_ms: 0,
    }
}

pub fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(5))
}

fn rejected(message: &str) -> BlockchainError {
    BlockchainError::Rejected {
        service: "algod",
        status: 400,
        message: message.to_string(),
    }
}

/// In-process ledger node.
///
/// A transaction is confirmed on the poll after `confirm_after` polls that
/// reported it pending.
pub struct FakeLedger {
    confirm_after: u32,
    asset_index: Option<u64>,
    created_assets: Vec<u64>,
    broadcast_error: Option<String>,
    pending_failures: u32,
    pool_error: String,
    fail_status: bool,
    fail_params: bool,
    round_time: Duration,

    round: AtomicU64,
    successful_polls: AtomicU32,
    tx_counter: AtomicU32,
    pub params_calls: AtomicU32,
    pub broadcast_calls: AtomicU32,
    pub pending_calls: AtomicU32,
    pub status_calls: AtomicU32,
    pub wait_calls: AtomicU32,
    pub account_calls: AtomicU32,
    pub last_broadcast: Mutex<Vec<u8>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            confirm_after: 0,
            asset_index: Some(1234),
            created_assets: Vec::new(),
            broadcast_error: None,
            pending_failures: 0,
            pool_error: String::new(),
            fail_status: false,
            fail_params: false,
            round_time: Duration::from_millis(2),
            round: AtomicU64::new(START_ROUND),
            successful_polls: AtomicU32::new(0),
            tx_counter: AtomicU32::new(0),
            params_calls: AtomicU32::new(0),
            broadcast_calls: AtomicU32::new(0),
            pending_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            wait_calls: AtomicU32::new(0),
            account_calls: AtomicU32::new(0),
            last_broadcast: Mutex::new(Vec::new()),
        }
    }

    pub fn confirm_after(mut self, polls: u32) -> Self {
        self.confirm_after = polls;
        self
    }

    pub fn never_confirm(self) -> Self {
        self.confirm_after(u32::MAX)
    }

    pub fn asset_index(mut self, index: Option<u64>) -> Self {
        self.asset_index = index;
        self
    }

    pub fn created_assets(mut self, assets: Vec<u64>) -> Self {
        self.created_assets = assets;
        self
    }

    pub fn reject_broadcast(mut self, message: &str) -> Self {
        self.broadcast_error = Some(message.to_string());
        self
    }

    pub fn pending_failures(mut self, failures: u32) -> Self {
        self.pending_failures = failures;
        self
    }

    pub fn pool_error(mut self, message: &str) -> Self {
        self.pool_error = message.to_string();
        self
    }

    pub fn fail_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    pub fn at_round(mut self, round: u64) -> Self {
        self.round = AtomicU64::new(round);
        self
    }

    pub fn fail_params(mut self) -> Self {
        self.fail_params = true;
        self
    }

    pub fn count(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerNode for FakeLedger {
    async fn suggested_params(&self) -> BlockchainResult<NetworkParams> {
        self.params_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_params {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(NetworkParams::new(
            0,
            1000,
            self.round.load(Ordering::SeqCst),
            "testnet-v1.0",
            [7u8; 32],
        ))
    }

    async fn broadcast(&self, signed: &[u8]) -> BlockchainResult<TxId> {
        self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.broadcast_error {
            return Err(rejected(message));
        }
        *self.last_broadcast.lock().unwrap() = signed.to_vec();
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        Ok(TxId(format!("FAKETX{:04}", n)))
    }

    async fn pending_transaction(&self, _tx_id: &TxId) -> BlockchainResult<PendingTransaction> {
        let call = self.pending_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.pending_failures {
            return Err(BlockchainError::Rpc("connection reset".to_string()));
        }
        if !self.pool_error.is_empty() {
            return Ok(PendingTransaction {
                pool_error: self.pool_error.clone(),
                ..Default::default()
            });
        }

        let polls = self.successful_polls.fetch_add(1, Ordering::SeqCst);
        if polls >= self.confirm_after {
            Ok(PendingTransaction {
                confirmed_round: self.round.load(Ordering::SeqCst),
                pool_error: String::new(),
                asset_index: self.asset_index,
            })
        } else {
            Ok(PendingTransaction::default())
        }
    }

    async fn status(&self) -> BlockchainResult<NodeStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_status {
            return Err(BlockchainError::Timeout(10));
        }
        Ok(NodeStatus {
            last_round: self.round.load(Ordering::SeqCst),
        })
    }

    async fn wait_for_round(&self, round: u64) -> BlockchainResult<NodeStatus> {
        self.wait_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.round_time).await;
        self.round.fetch_max(round, Ordering::SeqCst);
        Ok(NodeStatus { last_round: round })
    }

    async fn account_information(&self, address: &Address) -> BlockchainResult<AccountInfo> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccountInfo {
            address: address.to_string(),
            created_assets: self.created_assets.clone(),
        })
    }
}

/// In-process key daemon holding one wallet.
pub struct FakeKeyDaemon {
    wallets: Vec<WalletSummary>,
    fail_import: bool,
    fail_delete: bool,
    import_address: Option<String>,
    keys: Mutex<HashSet<String>>,
    pub list_calls: AtomicU32,
    pub init_calls: AtomicU32,
    pub import_calls: AtomicU32,
    pub delete_calls: AtomicU32,
}

impl FakeKeyDaemon {
    pub fn new() -> Self {
        Self {
            wallets: vec![
                WalletSummary {
                    id: "w-other".to_string(),
                    name: "other".to_string(),
                },
                WalletSummary {
                    id: "w-test".to_string(),
                    name: WALLET_NAME.to_string(),
                },
            ],
            fail_import: false,
            fail_delete: false,
            import_address: None,
            keys: Mutex::new(HashSet::new()),
            list_calls: AtomicU32::new(0),
            init_calls: AtomicU32::new(0),
            import_calls: AtomicU32::new(0),
            delete_calls: AtomicU32::new(0),
        }
    }

    pub fn without_wallets(mut self) -> Self {
        self.wallets.clear();
        self
    }

    pub fn fail_import(mut self) -> Self {
        self.fail_import = true;
        self
    }

    pub fn fail_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Report `address` from import regardless of the key.
    pub fn import_as(mut self, address: Address) -> Self {
        self.import_address = Some(address.to_string());
        self
    }

    /// Keys currently imported.
    pub fn held_keys(&self) -> usize {
        self.keys.lock().unwrap().len()
    }

    pub fn count(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyDaemon for FakeKeyDaemon {
    async fn list_wallets(&self) -> BlockchainResult<Vec<WalletSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.wallets.clone())
    }

    async fn init_wallet_handle(&self, wallet_id: &str, password: &str) -> BlockchainResult<String> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if password != WALLET_PASSWORD {
            return Err(BlockchainError::Rejected {
                service: "kmd",
                status: 401,
                message: "wrong password".to_string(),
            });
        }
        Ok(format!("handle-{}", wallet_id))
    }

    async fn import_key(&self, _handle: &str, private_key: &[u8; 64]) -> BlockchainResult<String> {
        self.import_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_import {
            return Err(BlockchainError::Rejected {
                service: "kmd",
                status: 400,
                message: "key already exists in wallet".to_string(),
            });
        }
        let address = match &self.import_address {
            Some(address) => address.clone(),
            None => {
                let mut public = [0u8; 32];
                public.copy_from_slice(&private_key[32..]);
                Address::from_public_key(public).to_string()
            }
        };
        self.keys.lock().unwrap().insert(address.clone());
        Ok(address)
    }

    async fn delete_key(&self, _handle: &str, _password: &str, address: &str) -> BlockchainResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete {
            return Err(BlockchainError::Timeout(10));
        }
        if self.keys.lock().unwrap().remove(address) {
            Ok(())
        } else {
            Err(BlockchainError::Rejected {
                service: "kmd",
                status: 404,
                message: "key does not exist".to_string(),
            })
        }
    }
}

/// Registry whose writes always fail.
pub struct FailingRegistry;

impl AssetRegistry for FailingRegistry {
    fn record_asset(&self, _owner: &Address, _asset_id: u64) -> Result<(), RegistryError> {
        Err(RegistryError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        )))
    }

    fn assets_for(&self, _owner: &Address) -> Vec<u64> {
        Vec::new()
    }
}

/// A lifecycle wired to fakes, with handles kept for assertions.
pub struct Harness {
    pub ledger: Arc<FakeLedger>,
    pub daemon: Arc<FakeKeyDaemon>,
    pub registry: Arc<MemoryRegistry>,
    pub lifecycle: Arc<AssetLifecycle>,
    pub identity: SigningIdentity,
}

impl Harness {
    pub fn new(ledger: FakeLedger, daemon: FakeKeyDaemon) -> Self {
        let ledger = Arc::new(ledger);
        let daemon = Arc::new(daemon);
        let registry = Arc::new(MemoryRegistry::new());
        let lifecycle = Arc::new(AssetLifecycle::new(
            ledger.clone(),
            daemon.clone(),
            registry.clone(),
            &confirmation_config(),
        ));
        Self {
            ledger,
            daemon,
            registry,
            lifecycle,
            identity: test_identity(),
        }
    }

    pub fn with_registry(ledger: FakeLedger, registry: Arc<dyn AssetRegistry>) -> Self {
        let mut harness = Self::new(ledger, FakeKeyDaemon::new());
        harness.lifecycle = Arc::new(AssetLifecycle::new(
            harness.ledger.clone(),
            harness.daemon.clone(),
            registry,
            &confirmation_config(),
        ));
        harness
    }

    pub fn imports(&self) -> u32 {
        FakeKeyDaemon::count(&self.daemon.import_calls)
    }

    pub fn releases(&self) -> u32 {
        FakeKeyDaemon::count(&self.daemon.delete_calls)
    }

    pub fn broadcasts(&self) -> u32 {
        FakeLedger::count(&self.ledger.broadcast_calls)
    }
}
