use tandem_core::CoreError;
use tandem_store::StoreError;
use thiserror::Error;

use crate::sender::TransportError;

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("redistribution fraction {value} is outside of [0, 1]")]
    InvalidFraction { value: String },

    #[error("transmission channel '{channel}' is not configured or not open")]
    NoChannel { channel: String },

    #[error("invalid provider fee pool address '{address}': {reason}")]
    NoRecipient { address: String, reason: String },

    #[error("transfer of {denom} failed, cycle cancelled: {source}")]
    Transport {
        denom: String,
        #[source]
        source: TransportError,
    },

    #[error("could not cancel transfer {sequence} of a failed cycle: {source}")]
    Rollback {
        sequence: u64,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ConsumerResult<T> = Result<T, ConsumerError>;
