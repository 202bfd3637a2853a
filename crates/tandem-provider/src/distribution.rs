//! Distribution collaborator: validator outstanding rewards and the
//! community pool. Allocation only ever adds to it; withdrawals belong to
//! the collaborator.

use cosmwasm_std::Decimal256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tandem_core::{Address, Coins, DecCoins};

use crate::allocation::Allocation;
use crate::error::ProviderResult;

pub trait DistributionLedger {
    /// Credits computed but not yet visible.
    type Staged;

    /// Compute the credits of `allocation` against the current state. Every
    /// failure happens here; nothing is written.
    fn stage(&self, allocation: &Allocation) -> ProviderResult<Self::Staged>;

    /// Make staged credits visible. Must directly follow `stage`.
    fn apply(&mut self, staged: Self::Staged);

    /// Credit every share of `allocation`. All-or-nothing.
    fn allocate_tokens(&mut self, allocation: &Allocation) -> ProviderResult<()> {
        let staged = self.stage(allocation)?;
        self.apply(staged);
        Ok(())
    }

    fn outstanding_rewards(&self, validator: &Address) -> DecCoins;

    fn community_pool(&self) -> DecCoins;
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDistribution {
    outstanding: BTreeMap<Address, DecCoins>,
    community_pool: DecCoins,
}

impl MemoryDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validators(&self) -> impl Iterator<Item = (&Address, &DecCoins)> {
        self.outstanding.iter()
    }

    /// Sum of all outstanding rewards plus the community pool.
    pub fn total(&self) -> ProviderResult<DecCoins> {
        let mut total = self.community_pool.clone();
        for rewards in self.outstanding.values() {
            total = total.checked_add(rewards)?;
        }
        Ok(total)
    }

    /// Withdraw commission at `rate`: `floor(outstanding * rate)` whole coins
    /// per denom, deducted from the validator's outstanding rewards.
    pub fn withdraw_validator_commission(
        &mut self,
        validator: &Address,
        rate: Decimal256,
    ) -> ProviderResult<Coins> {
        let outstanding = self.outstanding_rewards(validator);
        let (commission, _) = outstanding.mul_dec(rate)?.truncate();
        if commission.is_empty() {
            return Ok(commission);
        }
        let left = outstanding.checked_sub(&DecCoins::from_coins(&commission)?)?;
        if left.is_zero() {
            self.outstanding.remove(validator);
        } else {
            self.outstanding.insert(validator.clone(), left);
        }
        Ok(commission)
    }
}

/// Post-allocation balances of the community pool and every credited
/// validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedCredits {
    community_pool: DecCoins,
    outstanding: Vec<(Address, DecCoins)>,
}

impl DistributionLedger for MemoryDistribution {
    type Staged = StagedCredits;

    fn stage(&self, allocation: &Allocation) -> ProviderResult<StagedCredits> {
        let community_pool = self.community_pool.checked_add(&allocation.community)?;
        let mut outstanding = Vec::with_capacity(allocation.per_validator.len());
        for (validator, rewards) in &allocation.per_validator {
            outstanding.push((validator.clone(), self.outstanding_rewards(validator).checked_add(rewards)?));
        }
        Ok(StagedCredits {
            community_pool,
            outstanding,
        })
    }

    fn apply(&mut self, staged: StagedCredits) {
        self.community_pool = staged.community_pool;
        self.outstanding.extend(staged.outstanding);
    }

    fn outstanding_rewards(&self, validator: &Address) -> DecCoins {
        self.outstanding.get(validator).cloned().unwrap_or_default()
    }

    fn community_pool(&self) -> DecCoins {
        self.community_pool.clone()
    }
}
