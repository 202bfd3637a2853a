use std::path::Path;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};
use crate::{KvPair, KvStore, WriteOp};

/// Durable store backed by a sled database.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the database at `path`.
    ///
    /// A lock left behind by a killed process usually clears within a couple
    /// of seconds, so lock errors are retried with backoff before giving up.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let retry_delays_ms: [u64; 3] = [500, 1000, 2000];

        match sled::open(path) {
            Ok(db) => return Ok(Self { db }),
            Err(e) if is_lock_error(&e) => {
                log::warn!(
                    "state db lock held at {}, retrying ({} attempts remain)",
                    path.display(),
                    retry_delays_ms.len()
                );
            }
            Err(e) => return Err(e.into()),
        }

        for (i, delay_ms) in retry_delays_ms.iter().enumerate() {
            std::thread::sleep(Duration::from_millis(*delay_ms));
            match sled::open(path) {
                Ok(db) => {
                    log::info!("state db lock acquired on retry {}", i + 1);
                    return Ok(Self { db });
                }
                Err(e) if is_lock_error(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Locked {
            path: path.display().to_string(),
        })
    }

    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn is_lock_error(e: &sled::Error) -> bool {
    let msg = e.to_string();
    msg.contains("Resource temporarily unavailable")
        || msg.contains("WouldBlock")
        || msg.contains("lock")
        || msg.contains("EAGAIN")
}

impl KvStore for SledStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &[u8]) -> StoreResult<()> {
        self.db.remove(key)?;
        Ok(())
    }

    fn apply_batch(&mut self, ops: Vec<WriteOp>) -> StoreResult<()> {
        let mut batch = sled::Batch::default();
        for (key, value) in ops {
            match value {
                Some(v) => batch.insert(key, v),
                None => batch.remove(key),
            }
        }
        self.db.apply_batch(batch)?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KvPair>> {
        self.db
            .scan_prefix(prefix)
            .map(|entry| {
                let (k, v) = entry?;
                Ok((k.to_vec(), v.to_vec()))
            })
            .collect()
    }
}
