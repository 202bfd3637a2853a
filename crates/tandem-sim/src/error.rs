use tandem_consumer::ConsumerError;
use tandem_core::CoreError;
use tandem_provider::ProviderError;
use tandem_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("consumer: {0}")]
    Consumer(#[from] ConsumerError),

    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("metrics output is not utf-8: {0}")]
    MetricsEncoding(#[from] std::string::FromUtf8Error),

    #[error("invalid scenario: {0}")]
    Scenario(String),
}

pub type SimResult<T> = Result<T, SimError>;
