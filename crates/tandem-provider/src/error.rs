use tandem_core::CoreError;
use tandem_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("reward amount {amount} is negative")]
    NegativeAmount { amount: String },

    #[error(
        "cannot debit {requested}{denom} from the bucket of consumer {consumer_id}: balance is {balance}{denom}"
    )]
    InsufficientBucketBalance {
        consumer_id: String,
        denom: String,
        balance: String,
        requested: String,
    },

    #[error("consumer {consumer_id} has not been launched")]
    UnknownConsumer { consumer_id: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<cosmwasm_std::OverflowError> for ProviderError {
    fn from(e: cosmwasm_std::OverflowError) -> Self {
        ProviderError::Core(e.into())
    }
}

impl From<cosmwasm_std::CheckedFromRatioError> for ProviderError {
    fn from(e: cosmwasm_std::CheckedFromRatioError) -> Self {
        ProviderError::Core(e.into())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
