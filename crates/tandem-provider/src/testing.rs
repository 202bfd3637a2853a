//! Store wrapper whose writes can be switched off, for exercising commit
//! failures.

use tandem_store::{KvPair, KvStore, MemoryStore, StoreError, StoreResult};

#[derive(Default)]
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    pub fail_sets: bool,
}

impl KvStore for FlakyStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        if self.fail_sets {
            return Err(StoreError::Locked {
                path: "flaky".into(),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &[u8]) -> StoreResult<()> {
        self.inner.remove(key)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KvPair>> {
        self.inner.scan_prefix(prefix)
    }
}
