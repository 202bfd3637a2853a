// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - ALLOCATION ENGINE
//
// Splits a consumer's bucket between the community pool and the validators
// that have served the consumer long enough:
//
//   community    = floor(bucket * community_tax)
//   per_validator = (bucket - community) / eligible_count   (18 decimals)
//   remainder    = bucket - community - per_validator * eligible_count
//
// The remainder stays in the bucket. Voting power does not weight the split;
// any power weighting happens before rewards reach the bucket.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use cosmwasm_std::{Decimal256, Uint256};
use std::collections::BTreeMap;
use tandem_core::{Address, ConsumerValidator, DecCoins};

use crate::error::ProviderResult;

/// Outcome of one allocation round. Empty when nothing was allocated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub per_validator: BTreeMap<Address, DecCoins>,
    pub community: DecCoins,
    /// Left in the bucket for the next round.
    pub remainder: DecCoins,
    /// What leaves the bucket: community + per-validator shares.
    pub distributed: DecCoins,
}

impl Allocation {
    pub fn is_empty(&self) -> bool {
        self.distributed.is_zero()
    }
}

/// Validators with at least `eligibility_blocks` of tenure at `height`.
pub fn eligible_validators(
    validators: &[ConsumerValidator],
    height: i64,
    eligibility_blocks: i64,
) -> Vec<Address> {
    validators
        .iter()
        .filter(|v| v.is_eligible(height, eligibility_blocks))
        .map(|v| v.provider_cons_addr.clone())
        .collect()
}

/// Allocate `bucket` across `eligible` validators and the community pool.
pub fn allocate(
    bucket: &DecCoins,
    eligible: &[Address],
    community_tax: Decimal256,
) -> ProviderResult<Allocation> {
    if eligible.is_empty() || bucket.is_zero() {
        return Ok(Allocation::default());
    }

    let count = Decimal256::from_atomics(Uint256::from(eligible.len() as u128), 0)
        .map_err(tandem_core::CoreError::from)?;
    let mut share = DecCoins::new();
    let mut community = DecCoins::new();
    let mut distributed = DecCoins::new();
    let mut remainder = DecCoins::new();

    for (denom, amount) in bucket.iter() {
        let tax = amount.checked_mul(community_tax)?.floor();
        let distributable = amount.checked_sub(tax)?;
        let per_validator = distributable.checked_div(count)?;
        let out = tax.checked_add(per_validator.checked_mul(count)?)?;

        community.set(denom, tax);
        share.set(denom, per_validator);
        distributed.set(denom, out);
        remainder.set(denom, amount.checked_sub(out)?);
    }

    let per_validator = if share.is_zero() {
        BTreeMap::new()
    } else {
        eligible.iter().map(|addr| (addr.clone(), share.clone())).collect()
    };

    Ok(Allocation {
        per_validator,
        community,
        remainder,
        distributed,
    })
}
