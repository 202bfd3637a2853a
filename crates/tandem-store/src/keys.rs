// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - KEY SCHEMA
//
// One prefix byte per record kind, followed by length-delimited components
// (u16 big-endian length + bytes). Length-delimiting keeps "ab"/"c" and
// "a"/"bc" distinct and lets a prefix scan select every record of one
// consumer without matching a consumer whose id merely starts the same way.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::error::{StoreError, StoreResult};

pub const SCHEDULE_MARKER: u8 = 0x01;
pub const REWARD_BUCKET: u8 = 0x02;
pub const ALLOWLIST_DENOM: u8 = 0x03;
pub const CONSUMER_VALIDATOR: u8 = 0x04;
pub const CHANNEL_TO_CONSUMER: u8 = 0x05;
pub const SETTLEMENT_CARRY: u8 = 0x06;
pub const LAUNCHED_CONSUMER: u8 = 0x07;

pub fn compose(prefix: u8, components: &[&str]) -> StoreResult<Vec<u8>> {
    let mut key = vec![prefix];
    for c in components {
        let len = u16::try_from(c.len()).map_err(|_| StoreError::ComponentTooLong { len: c.len() })?;
        key.extend_from_slice(&len.to_be_bytes());
        key.extend_from_slice(c.as_bytes());
    }
    Ok(key)
}

/// Inverse of `compose`: the prefix byte and the string components.
pub fn decompose(key: &[u8]) -> StoreResult<(u8, Vec<String>)> {
    let malformed = || StoreError::MalformedKey { key: key.to_vec() };
    let (&prefix, mut rest) = key.split_first().ok_or_else(malformed)?;
    let mut components = Vec::new();
    while !rest.is_empty() {
        if rest.len() < 2 {
            return Err(malformed());
        }
        let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
        let body = rest.get(2..2 + len).ok_or_else(malformed)?;
        let text = std::str::from_utf8(body).map_err(|_| malformed())?;
        components.push(text.to_string());
        rest = &rest[2 + len..];
    }
    Ok((prefix, components))
}

// ─────────────────────────────────────────────────────────────────
// Record keys
// ─────────────────────────────────────────────────────────────────

pub fn schedule_marker(chain_id: &str) -> StoreResult<Vec<u8>> {
    compose(SCHEDULE_MARKER, &[chain_id])
}

pub fn reward_bucket(consumer_id: &str, denom: &str) -> StoreResult<Vec<u8>> {
    compose(REWARD_BUCKET, &[consumer_id, denom])
}

pub fn reward_buckets_of(consumer_id: &str) -> StoreResult<Vec<u8>> {
    compose(REWARD_BUCKET, &[consumer_id])
}

pub fn allowlist_denom(denom: &str) -> StoreResult<Vec<u8>> {
    compose(ALLOWLIST_DENOM, &[denom])
}

pub fn consumer_validator(consumer_id: &str, provider_cons_addr: &str) -> StoreResult<Vec<u8>> {
    compose(CONSUMER_VALIDATOR, &[consumer_id, provider_cons_addr])
}

pub fn consumer_validators_of(consumer_id: &str) -> StoreResult<Vec<u8>> {
    compose(CONSUMER_VALIDATOR, &[consumer_id])
}

pub fn channel_to_consumer(channel_id: &str) -> StoreResult<Vec<u8>> {
    compose(CHANNEL_TO_CONSUMER, &[channel_id])
}

pub fn settlement_carry(denom: &str) -> StoreResult<Vec<u8>> {
    compose(SETTLEMENT_CARRY, &[denom])
}

pub fn launched_consumer(consumer_id: &str) -> StoreResult<Vec<u8>> {
    compose(LAUNCHED_CONSUMER, &[consumer_id])
}
