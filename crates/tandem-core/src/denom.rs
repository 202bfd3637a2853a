// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - DENOMINATION TRACES
//
// Denominations that cross the transfer channel are prefixed with the
// receiving port/channel ("transfer/channel-0/stake") and stored on-chain as
// a fixed-length hash ("ibc/27394FB0...").
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

pub const IBC_DENOM_PREFIX: &str = "ibc/";
const MIN_DENOM_LEN: usize = 3;
const MAX_DENOM_LEN: usize = 128;

/// Checks a denomination against the bank module rules:
/// a letter, followed by 2..=127 characters from `[a-zA-Z0-9/:._-]`.
pub fn validate_denom(denom: &str) -> CoreResult<()> {
    let invalid = || CoreError::InvalidDenom {
        denom: denom.to_string(),
    };
    if denom.len() < MIN_DENOM_LEN || denom.len() > MAX_DENOM_LEN {
        return Err(invalid());
    }
    let mut chars = denom.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(invalid()),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-')) {
        return Err(invalid());
    }
    Ok(())
}

/// `"{port}/{channel}/"`
pub fn denom_prefix(port: &str, channel: &str) -> String {
    format!("{}/{}/", port, channel)
}

/// `"{port}/{channel}/{base}"`
pub fn prefixed_denom(port: &str, channel: &str, base: &str) -> String {
    format!("{}{}", denom_prefix(port, channel), base)
}

/// True when `denom` carries the prefix of the channel it is travelling back
/// through, i.e. the receiving chain originally sent it.
pub fn receiver_chain_is_source(source_port: &str, source_channel: &str, denom: &str) -> bool {
    denom.starts_with(&denom_prefix(source_port, source_channel))
}

/// Hop path plus base denomination.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DenomTrace {
    /// `port/channel` pairs, outermost first. Empty for native denoms.
    pub path: String,
    pub base_denom: String,
}

impl DenomTrace {
    /// Split a full prefixed denomination into its hop path and base denom.
    /// A hop is a `port/channel-N` pair; everything after the last hop is
    /// the base denomination (which may itself contain slashes).
    pub fn parse(full: &str) -> Self {
        let parts: Vec<&str> = full.split('/').collect();
        let mut hops = 0;
        while hops * 2 + 1 < parts.len() && parts[hops * 2 + 1].starts_with("channel-") {
            hops += 1;
        }
        // a trailing port/channel with no base left is not a trace
        if hops > 0 && hops * 2 == parts.len() {
            hops -= 1;
        }
        let path = parts[..hops * 2].join("/");
        let base_denom = parts[hops * 2..].join("/");
        Self { path, base_denom }
    }

    pub fn full_path(&self) -> String {
        if self.path.is_empty() {
            self.base_denom.clone()
        } else {
            format!("{}/{}", self.path, self.base_denom)
        }
    }

    /// On-chain denomination: the base denom itself when native, otherwise
    /// `ibc/` followed by the uppercase hex SHA-256 of the full path.
    pub fn ibc_denom(&self) -> String {
        if self.path.is_empty() {
            return self.base_denom.clone();
        }
        let hash = Sha256::digest(self.full_path().as_bytes());
        format!("{}{}", IBC_DENOM_PREFIX, hex::encode_upper(hash))
    }
}

/// On-chain denomination for `base` after it crossed `port/channel`.
pub fn ibc_denom(port: &str, channel: &str, base: &str) -> String {
    DenomTrace::parse(&prefixed_denom(port, channel, base)).ibc_denom()
}

/// Denomination a transfer resolves to on the receiving (provider) side.
///
/// Returning tokens are unwrapped by one hop; foreign tokens gain the
/// destination hop and are hashed.
pub fn provider_denom(
    denom: &str,
    source_port: &str,
    source_channel: &str,
    dest_port: &str,
    dest_channel: &str,
) -> String {
    if receiver_chain_is_source(source_port, source_channel, denom) {
        let unprefixed = &denom[denom_prefix(source_port, source_channel).len()..];
        DenomTrace::parse(unprefixed).ibc_denom()
    } else {
        DenomTrace::parse(&prefixed_denom(dest_port, dest_channel, denom)).ibc_denom()
    }
}
