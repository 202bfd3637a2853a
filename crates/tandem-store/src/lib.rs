// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - STATE STORE
//
// Byte-level key/value capability the reward keepers persist through:
// - MemoryStore: BTreeMap, for tests and the simulator
// - SledStore:   sled database, for durable state
// - StoreCache:  write-buffer over any store; commit or drop as a unit
// Values are bincode-encoded; keys follow the schema in `keys`.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod error;
pub mod keys;
mod sled_store;

pub use error::{StoreError, StoreResult};
pub use sled_store::SledStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

pub type KvPair = (Vec<u8>, Vec<u8>);

/// A buffered write; `None` deletes the key.
pub type WriteOp = (Vec<u8>, Option<Vec<u8>>);

pub trait KvStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()>;

    fn remove(&mut self, key: &[u8]) -> StoreResult<()>;

    /// Every pair whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KvPair>>;

    /// Apply every write or none of them. Stores without native batches
    /// restore the keys already written when a later write fails.
    fn apply_batch(&mut self, ops: Vec<WriteOp>) -> StoreResult<()> {
        let mut undo: Vec<WriteOp> = Vec::with_capacity(ops.len());
        for (key, value) in ops {
            let previous = self.get(&key)?;
            let applied = match value {
                Some(v) => self.set(&key, v),
                None => self.remove(&key),
            };
            if let Err(e) = applied {
                for (key, previous) in undo.into_iter().rev() {
                    let restored = match previous {
                        Some(v) => self.set(&key, v),
                        None => self.remove(&key),
                    };
                    if let Err(restore) = restored {
                        log::error!("failed to restore key {:02x?}: {}", key, restore);
                    }
                }
                return Err(e);
            }
            undo.push((key, previous));
        }
        Ok(())
    }

    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn get_value<T: DeserializeOwned>(&self, key: &[u8]) -> StoreResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn set_value<T: Serialize>(&mut self, key: &[u8], value: &T) -> StoreResult<()>
    where
        Self: Sized,
    {
        let bytes = bincode::serialize(value)?;
        self.set(key, bytes)
    }

    /// Decoded values under `prefix` together with their decomposed keys.
    fn scan_values<T: DeserializeOwned>(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<String>, T)>>
    where
        Self: Sized,
    {
        self.scan_prefix(prefix)?
            .into_iter()
            .map(|(k, v)| {
                let (_, parts) = keys::decompose(&k)?;
                Ok((parts, bincode::deserialize(&v)?))
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────
// MemoryStore
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.data.insert(key.to_vec(), value);
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> StoreResult<()> {
        self.data.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KvPair>> {
        Ok(self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

// ─────────────────────────────────────────────────────────────────
// StoreCache
// ─────────────────────────────────────────────────────────────────

/// Buffers writes over `parent`. Reads see the buffered writes. Nothing
/// reaches the parent until `commit`; dropping the cache discards it.
pub struct StoreCache<'a, S: KvStore> {
    parent: &'a mut S,
    // None marks a buffered delete
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a, S: KvStore> StoreCache<'a, S> {
    pub fn new(parent: &'a mut S) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Write the buffer through to the parent as one batch.
    pub fn commit(self) -> StoreResult<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        self.parent.apply_batch(self.writes.into_iter().collect())
    }
}

impl<S: KvStore> KvStore for StoreCache<'_, S> {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(buffered) => Ok(buffered.clone()),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.writes.insert(key.to_vec(), Some(value));
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> StoreResult<()> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KvPair>> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.scan_prefix(prefix)?.into_iter().collect();
        for (k, v) in self.writes.range(prefix.to_vec()..) {
            if !k.starts_with(prefix) {
                break;
            }
            match v {
                Some(v) => {
                    merged.insert(k.clone(), v.clone());
                }
                None => {
                    merged.remove(k);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
