// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - PER-CONSUMER REWARD LEDGER
//
// One bucket per (consumer, denom) holding rewards that arrived but were not
// yet allocated. Buckets are created on first credit and never removed; a
// bucket may rest at zero or at a sub-unit remainder.
//
// Arrivals are credited whether or not the denom is allow-listed, so a later
// listing releases value that arrived earlier.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use cosmwasm_std::Decimal256;
use std::str::FromStr;
use tandem_core::{CoreError, DecCoins};
use tandem_store::{keys, KvStore};

use crate::error::{ProviderError, ProviderResult};

/// Parse a reward amount, rejecting negatives with `NegativeAmount`.
pub fn parse_amount(raw: &str) -> ProviderResult<Decimal256> {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        return Err(ProviderError::NegativeAmount {
            amount: trimmed.to_string(),
        });
    }
    Decimal256::from_str(trimmed).map_err(|_| {
        ProviderError::Core(CoreError::InvalidCoins {
            input: raw.to_string(),
        })
    })
}

pub fn balance<S: KvStore>(store: &S, consumer_id: &str, denom: &str) -> ProviderResult<Decimal256> {
    let key = keys::reward_bucket(consumer_id, denom)?;
    Ok(store.get_value(&key)?.unwrap_or_default())
}

/// Whether a bucket exists, even one resting at zero.
pub fn exists<S: KvStore>(store: &S, consumer_id: &str, denom: &str) -> ProviderResult<bool> {
    Ok(store.has(&keys::reward_bucket(consumer_id, denom)?)?)
}

pub fn credit<S: KvStore>(
    store: &mut S,
    consumer_id: &str,
    denom: &str,
    amount: Decimal256,
) -> ProviderResult<Decimal256> {
    let updated = balance(store, consumer_id, denom)?.checked_add(amount)?;
    store.set_value(&keys::reward_bucket(consumer_id, denom)?, &updated)?;
    Ok(updated)
}

pub fn debit<S: KvStore>(
    store: &mut S,
    consumer_id: &str,
    denom: &str,
    amount: Decimal256,
) -> ProviderResult<Decimal256> {
    let current = balance(store, consumer_id, denom)?;
    let updated = current
        .checked_sub(amount)
        .map_err(|_| ProviderError::InsufficientBucketBalance {
            consumer_id: consumer_id.to_string(),
            denom: denom.to_string(),
            balance: current.to_string(),
            requested: amount.to_string(),
        })?;
    store.set_value(&keys::reward_bucket(consumer_id, denom)?, &updated)?;
    Ok(updated)
}

/// Every nonzero bucket of `consumer_id`.
pub fn buckets_of<S: KvStore>(store: &S, consumer_id: &str) -> ProviderResult<DecCoins> {
    let mut out = DecCoins::new();
    for (parts, amount) in store.scan_values::<Decimal256>(&keys::reward_buckets_of(consumer_id)?)? {
        if let [_, denom] = parts.as_slice() {
            out.set(denom, amount);
        }
    }
    Ok(out)
}
