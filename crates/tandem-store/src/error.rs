use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("failed to encode or decode value: {0}")]
    Codec(#[from] bincode::Error),

    #[error("malformed key {key:02x?}")]
    MalformedKey { key: Vec<u8> },

    #[error("key component of {len} bytes exceeds the 65535 byte limit")]
    ComponentTooLong { len: usize },

    #[error("database at {path} is locked by another process")]
    Locked { path: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
