// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - PROVIDER KEEPER
//
// Owns the provider's reward state: launched consumers, transfer-channel
// mapping, consumer validator records, the denom allow-list, per-consumer
// buckets and the settlement carry.
//
// begin_block runs the allocation engine for every (consumer, allowed denom)
// pair with a nonzero bucket. Each pair commits on its own: a failure is
// logged and leaves that pair untouched while the others proceed. Credits
// are staged with the distribution ledger and only applied once the bucket
// debit and carry are committed.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Settlement: allocation works in 18-decimal amounts but the bank only moves
// whole coins. Per denom, the allocated-but-unsettled amount accumulates in a
// carry, and each block floor(carry) coins move from the consumer-rewards
// pool to the distribution account.

use cosmwasm_std::Decimal256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tandem_core::{
    Address, Coins, ConsumerValidator, DecCoins, LedgerAccessor, ProviderParams,
    CONSUMER_REWARDS_POOL, DISTRIBUTION,
};
use tandem_store::{keys, KvStore, StoreCache};

use crate::allocation::{allocate, eligible_validators, Allocation};
use crate::denom_gate;
use crate::distribution::DistributionLedger;
use crate::error::{ProviderError, ProviderResult};
use crate::reward_ledger;

/// One (consumer, denom) allocation applied during begin_block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    pub consumer_id: String,
    pub denom: String,
    pub validators: usize,
    pub per_validator: Decimal256,
    pub community: Decimal256,
    pub remainder: Decimal256,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeginBlockReport {
    pub allocations: Vec<AllocationRecord>,
    pub failures: usize,
    pub settled: Coins,
}

pub struct ProviderKeeper<S: KvStore> {
    pub(crate) store: S,
}

impl<S: KvStore> ProviderKeeper<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Seed the allow-list from the initial parameters.
    pub fn init_genesis(&mut self, params: &ProviderParams) -> ProviderResult<()> {
        for denom in &params.consumer_reward_denoms {
            denom_gate::allow(&mut self.store, denom)?;
        }
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────
    // Administrative actions
    // ─────────────────────────────────────────────────────────────────

    pub fn launch_consumer(&mut self, consumer_id: &str) -> ProviderResult<()> {
        self.store
            .set_value(&keys::launched_consumer(consumer_id)?, &true)?;
        log::info!("consumer {} launched", consumer_id);
        Ok(())
    }

    pub fn register_transfer_channel(
        &mut self,
        channel_id: &str,
        consumer_id: &str,
    ) -> ProviderResult<()> {
        if !self.is_launched(consumer_id)? {
            return Err(ProviderError::UnknownConsumer {
                consumer_id: consumer_id.to_string(),
            });
        }
        self.store.set_value(
            &keys::channel_to_consumer(channel_id)?,
            &consumer_id.to_string(),
        )?;
        Ok(())
    }

    pub fn set_consumer_reward_denom(&mut self, denom: &str) -> ProviderResult<()> {
        denom_gate::allow(&mut self.store, denom)?;
        log::info!("reward denom {} allow-listed", denom);
        Ok(())
    }

    pub fn remove_consumer_reward_denom(&mut self, denom: &str) -> ProviderResult<()> {
        denom_gate::disallow(&mut self.store, denom)?;
        log::info!("reward denom {} removed from allow-list", denom);
        Ok(())
    }

    pub fn set_consumer_validator(&mut self, validator: &ConsumerValidator) -> ProviderResult<()> {
        if !self.is_launched(&validator.consumer_id)? {
            return Err(ProviderError::UnknownConsumer {
                consumer_id: validator.consumer_id.clone(),
            });
        }
        let key = keys::consumer_validator(
            &validator.consumer_id,
            validator.provider_cons_addr.as_str(),
        )?;
        self.store.set_value(&key, validator)?;
        Ok(())
    }

    pub fn delete_consumer_validator(
        &mut self,
        consumer_id: &str,
        provider_cons_addr: &Address,
    ) -> ProviderResult<()> {
        let key = keys::consumer_validator(consumer_id, provider_cons_addr.as_str())?;
        self.store.remove(&key)?;
        Ok(())
    }

    pub fn delete_consumer_validators(&mut self, consumer_id: &str) -> ProviderResult<()> {
        let prefix = keys::consumer_validators_of(consumer_id)?;
        for (key, _) in self.store.scan_prefix(&prefix)? {
            self.store.remove(&key)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────

    pub fn is_launched(&self, consumer_id: &str) -> ProviderResult<bool> {
        Self::is_launched_in(&self.store, consumer_id)
    }

    pub(crate) fn is_launched_in<K: KvStore>(store: &K, consumer_id: &str) -> ProviderResult<bool> {
        Ok(store.has(&keys::launched_consumer(consumer_id)?)?)
    }

    pub fn launched_consumers(&self) -> ProviderResult<Vec<String>> {
        Ok(self
            .store
            .scan_values::<bool>(&[keys::LAUNCHED_CONSUMER])?
            .into_iter()
            .filter_map(|(mut parts, _)| parts.pop())
            .collect())
    }

    pub fn consumer_for_channel(&self, channel_id: &str) -> ProviderResult<Option<String>> {
        Self::consumer_for_channel_in(&self.store, channel_id)
    }

    pub(crate) fn consumer_for_channel_in<K: KvStore>(
        store: &K,
        channel_id: &str,
    ) -> ProviderResult<Option<String>> {
        Ok(store.get_value(&keys::channel_to_consumer(channel_id)?)?)
    }

    pub fn consumer_validators(&self, consumer_id: &str) -> ProviderResult<Vec<ConsumerValidator>> {
        Ok(self
            .store
            .scan_values::<ConsumerValidator>(&keys::consumer_validators_of(consumer_id)?)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    pub fn allowed_denoms(&self) -> ProviderResult<BTreeSet<String>> {
        denom_gate::allowed_denoms(&self.store)
    }

    pub fn is_denom_allowed(&self, denom: &str) -> ProviderResult<bool> {
        denom_gate::is_allowed(&self.store, denom)
    }

    /// Undistributed rewards of `consumer_id`, allowed or not.
    pub fn bucket(&self, consumer_id: &str) -> ProviderResult<DecCoins> {
        reward_ledger::buckets_of(&self.store, consumer_id)
    }

    pub fn settlement_carry(&self, denom: &str) -> ProviderResult<Decimal256> {
        Ok(self
            .store
            .get_value(&keys::settlement_carry(denom)?)?
            .unwrap_or_default())
    }

    // ─────────────────────────────────────────────────────────────────
    // Block processing
    // ─────────────────────────────────────────────────────────────────

    pub fn begin_block<L, D>(
        &mut self,
        height: i64,
        params: &ProviderParams,
        ledger: &mut L,
        distribution: &mut D,
    ) -> ProviderResult<BeginBlockReport>
    where
        L: LedgerAccessor,
        D: DistributionLedger,
    {
        let mut report = BeginBlockReport::default();
        if height <= 1 {
            return Ok(report);
        }

        let allowed = self.allowed_denoms()?;
        let eligibility_blocks = params.eligibility_blocks();

        for consumer_id in self.launched_consumers()? {
            let validators = self.consumer_validators(&consumer_id)?;
            let eligible = eligible_validators(&validators, height, eligibility_blocks);
            let bucket = self.bucket(&consumer_id)?;

            for (denom, amount) in bucket.iter() {
                if !allowed.contains(denom) {
                    continue;
                }
                let mut single = DecCoins::new();
                single.set(denom, amount);

                match self.allocate_pair(&consumer_id, denom, &single, &eligible, params, distribution) {
                    Ok(Some(record)) => {
                        log::info!(
                            "consumer {}: allocated {}{} to {} validator(s), {} to community pool",
                            consumer_id,
                            record.per_validator,
                            denom,
                            record.validators,
                            record.community
                        );
                        report.allocations.push(record);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::error!(
                            "consumer {}: allocation of {} failed: {}",
                            consumer_id,
                            denom,
                            e
                        );
                        report.failures += 1;
                    }
                }
            }
        }

        report.settled = self.settle(ledger)?;
        Ok(report)
    }

    fn allocate_pair<D: DistributionLedger>(
        &mut self,
        consumer_id: &str,
        denom: &str,
        bucket: &DecCoins,
        eligible: &[Address],
        params: &ProviderParams,
        distribution: &mut D,
    ) -> ProviderResult<Option<AllocationRecord>> {
        let allocation: Allocation = allocate(bucket, eligible, params.community_tax)?;
        if allocation.is_empty() {
            return Ok(None);
        }
        let out = allocation.distributed.amount_of(denom);

        let mut cache = StoreCache::new(&mut self.store);
        reward_ledger::debit(&mut cache, consumer_id, denom, out)?;
        let carry_key = keys::settlement_carry(denom)?;
        let carry: Decimal256 = cache.get_value(&carry_key)?.unwrap_or_default();
        cache.set_value(&carry_key, &carry.checked_add(out)?)?;

        let staged = distribution.stage(&allocation)?;
        cache.commit()?;
        distribution.apply(staged);

        Ok(Some(AllocationRecord {
            consumer_id: consumer_id.to_string(),
            denom: denom.to_string(),
            validators: allocation.per_validator.len(),
            per_validator: allocation
                .per_validator
                .values()
                .next()
                .map(|r| r.amount_of(denom))
                .unwrap_or_default(),
            community: allocation.community.amount_of(denom),
            remainder: allocation.remainder.amount_of(denom),
        }))
    }

    /// Move whole settled coins from the rewards pool to distribution.
    pub fn settle<L: LedgerAccessor>(&mut self, ledger: &mut L) -> ProviderResult<Coins> {
        let mut settled = Coins::new();
        for (parts, carry) in self
            .store
            .scan_values::<Decimal256>(&[keys::SETTLEMENT_CARRY])?
        {
            let Some(denom) = parts.first() else { continue };
            let whole = carry.to_uint_floor();
            if whole.is_zero() {
                continue;
            }
            let mut coins = Coins::new();
            coins.add_amount(denom, whole)?;
            let left = carry.checked_sub(carry.floor())?;
            if let Err(e) = ledger.transfer(CONSUMER_REWARDS_POOL, DISTRIBUTION, &coins) {
                log::error!("settlement of {} failed: {}", coins, e);
                continue;
            }
            if let Err(e) = self.store.set_value(&keys::settlement_carry(denom)?, &left) {
                log::error!("settlement of {} not recorded, moving it back: {}", coins, e);
                if let Err(e) = ledger.transfer(DISTRIBUTION, CONSUMER_REWARDS_POOL, &coins) {
                    log::error!("could not return {} to the rewards pool: {}", coins, e);
                }
                continue;
            }
            settled.add_amount(denom, whole)?;
        }
        if !settled.is_empty() {
            log::debug!("settled {} into distribution", settled);
        }
        Ok(settled)
    }
}
