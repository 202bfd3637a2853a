use cosmwasm_std::{CheckedFromRatioError, Decimal256RangeExceeded, OverflowError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid denomination '{denom}'")]
    InvalidDenom { denom: String },

    #[error("invalid address '{address}': {reason}")]
    InvalidAddress {
        address: String,
        reason: &'static str,
    },

    #[error("could not parse coins from '{input}'")]
    InvalidCoins { input: String },

    #[error("insufficient funds in '{account}': available {available}, required {required}")]
    InsufficientFunds {
        account: String,
        available: String,
        required: String,
    },

    #[error("fraction {value} is outside of [0, 1]")]
    InvalidFraction { value: String },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("malformed transfer packet: {0}")]
    MalformedPacket(String),

    #[error("{source}")]
    Overflow {
        #[from]
        source: OverflowError,
    },

    #[error("{source}")]
    Ratio {
        #[from]
        source: CheckedFromRatioError,
    },

    #[error("{source}")]
    DecimalRange {
        #[from]
        source: Decimal256RangeExceeded,
    },

    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("failed to encode config: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
