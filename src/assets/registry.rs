//! Asset ownership registry and its JSON file persistence.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use thiserror::Error;

use crate::blockchain::Address;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Where created assets are recorded against their owner.
pub trait AssetRegistry: Send + Sync {
    /// Record that `owner` created `asset_id`. Idempotent.
    fn record_asset(&self, owner: &Address, asset_id: u64) -> RegistryResult<()>;

    /// Asset ids recorded for `owner`, ascending.
    fn assets_for(&self, owner: &Address) -> Vec<u64>;
}

type OwnerMap = DashMap<Address, BTreeSet<u64>>;

fn insert(map: &OwnerMap, owner: &Address, asset_id: u64) -> bool {
    map.entry(*owner).or_default().insert(asset_id)
}

fn lookup(map: &OwnerMap, owner: &Address) -> Vec<u64> {
    map.get(owner)
        .map(|r| r.value().iter().copied().collect())
        .unwrap_or_default()
}

fn total(map: &OwnerMap) -> usize {
    map.iter().map(|r| r.value().len()).sum()
}

/// In-memory registry.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<OwnerMap>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        total(&self.inner)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetRegistry for MemoryRegistry {
    fn record_asset(&self, owner: &Address, asset_id: u64) -> RegistryResult<()> {
        insert(&self.inner, owner, asset_id);
        Ok(())
    }

    fn assets_for(&self, owner: &Address) -> Vec<u64> {
        lookup(&self.inner, owner)
    }
}

/// Registry persisted to a JSON file, rewritten after every new record.
#[derive(Clone)]
pub struct JsonFileRegistry {
    inner: Arc<OwnerMap>,
    path: PathBuf,
    /// Held from snapshot to rename so saves land in order.
    save_lock: Arc<Mutex<()>>,
}

impl JsonFileRegistry {
    /// Open the registry at `path`, loading existing records if the file
    /// exists.
    pub fn open(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let registry = Self {
            inner: Arc::new(DashMap::new()),
            path: path.as_ref().to_path_buf(),
            save_lock: Arc::new(Mutex::new(())),
        };
        if registry.path.exists() {
            let reader = BufReader::new(File::open(&registry.path)?);
            let map: HashMap<Address, BTreeSet<u64>> = serde_json::from_reader(reader)?;
            for (owner, assets) in map {
                registry.inner.insert(owner, assets);
            }
            tracing::info!(
                path = %registry.path.display(),
                owners = registry.inner.len(),
                "Loaded asset registry"
            );
        }
        metrics::record_registry_size(total(&registry.inner));
        Ok(registry)
    }

    /// Write the whole registry to its file.
    pub fn save(&self) -> RegistryResult<()> {
        let _guard = self
            .save_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let map: HashMap<Address, BTreeSet<u64>> = self
            .inner
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();

        let tmp = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        let written = File::create(&tmp)
            .map_err(RegistryError::from)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                serde_json::to_writer(&mut writer, &map)?;
                writer.flush()?;
                Ok(())
            })
            .and_then(|()| std::fs::rename(&tmp, &self.path).map_err(RegistryError::from));
        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written?;
        tracing::debug!(path = %self.path.display(), owners = map.len(), "Saved asset registry");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AssetRegistry for JsonFileRegistry {
    fn record_asset(&self, owner: &Address, asset_id: u64) -> RegistryResult<()> {
        if insert(&self.inner, owner, asset_id) {
            metrics::record_registry_size(total(&self.inner));
            self.save()?;
        }
        Ok(())
    }

    fn assets_for(&self, owner: &Address) -> Vec<u64> {
        lookup(&self.inner, owner)
    }
}
