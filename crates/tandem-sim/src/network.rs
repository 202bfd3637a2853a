// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - TWO-CHAIN NETWORK
//
// One consumer and one provider advancing in lockstep. Per block:
//   provider begin_block → relay packets sent last block → fees minted on
//   the consumer → consumer end_block
// so a transmission lands on the provider one block after it leaves.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::Serialize;
use std::collections::BTreeMap;

use tandem_consumer::{ConsumerKeeper, Transmission};
use tandem_core::denom::ibc_denom;
use tandem_core::{
    Acknowledgement, Address, Coins, ConsumerParams, ConsumerValidator, DecCoins, InMemoryLedger,
    LedgerAccessor, ProviderParams, DISTRIBUTION, FEE_COLLECTOR, TRANSFER_PORT,
};
use tandem_provider::{DistributionLedger, MemoryDistribution, ProviderKeeper};
use tandem_store::KvStore;

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::metrics::TandemMetrics;
use crate::transport::LoopbackTransport;

/// Consensus-address prefix of provider validators.
pub const VALCONS_HRP: &str = "cosmosvalcons";

pub fn validator_address(name: &str) -> Address {
    Address::module(VALCONS_HRP, name)
}

pub struct ConsumerChain<S: KvStore> {
    pub keeper: ConsumerKeeper<S>,
    pub bank: InMemoryLedger,
    pub params: ConsumerParams,
    pub height: i64,
}

pub struct ProviderChain<S: KvStore> {
    pub keeper: ProviderKeeper<S>,
    pub bank: InMemoryLedger,
    pub distribution: MemoryDistribution,
    pub params: ProviderParams,
    pub height: i64,
}

/// What one block did on both chains.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub height: i64,
    pub transmission: Transmission,
    pub delivered: usize,
    pub rejected: usize,
    pub timed_out: usize,
    pub allocations: usize,
    pub settled: Coins,
}

/// End-of-run snapshot of both chains.
#[derive(Serialize, Debug, Clone)]
pub struct SimReport {
    pub consumer_height: i64,
    pub provider_height: i64,
    pub last_transmission_height: i64,
    pub in_flight: usize,
    pub consumer_balances: BTreeMap<String, Coins>,
    pub provider_balances: BTreeMap<String, Coins>,
    pub buckets: BTreeMap<String, DecCoins>,
    pub outstanding_rewards: BTreeMap<String, DecCoins>,
    pub community_pool: DecCoins,
}

#[derive(Default)]
struct RelayOutcome {
    delivered: usize,
    rejected: usize,
    timed_out: usize,
}

pub struct TwoChainNetwork<S: KvStore> {
    pub consumer: ConsumerChain<S>,
    pub provider: ProviderChain<S>,
    pub transport: LoopbackTransport,
    pub metrics: TandemMetrics,
    fees_per_block: Coins,
}

impl<S: KvStore> TwoChainNetwork<S> {
    /// Bring both chains to genesis and wire the consumer into the provider.
    pub fn new(config: &SimConfig, consumer_store: S, provider_store: S) -> SimResult<Self> {
        config.validate()?;
        let consumer_id = &config.consumer.consumer_id;
        let consumer_channel = &config.consumer.distribution_transmission_channel;
        let provider_channel = &config.scenario.provider_channel;

        let mut consumer_keeper = ConsumerKeeper::new(consumer_store, &config.consumer.chain_id);
        consumer_keeper.init_genesis(0)?;

        let mut provider_keeper = ProviderKeeper::new(provider_store);
        provider_keeper.init_genesis(&config.provider)?;
        provider_keeper.launch_consumer(consumer_id)?;
        provider_keeper.register_transfer_channel(provider_channel, consumer_id)?;
        if config.scenario.allow_consumer_denoms {
            for denom in &config.consumer.reward_denoms {
                provider_keeper
                    .set_consumer_reward_denom(&ibc_denom(TRANSFER_PORT, provider_channel, denom))?;
            }
        }
        for v in &config.scenario.validators {
            provider_keeper.set_consumer_validator(&ConsumerValidator {
                consumer_id: consumer_id.clone(),
                provider_cons_addr: validator_address(&v.name),
                voting_power: v.voting_power,
                join_height: v.join_height,
                commission_rate: v.commission_rate,
            })?;
        }

        let mut transport = LoopbackTransport::new(consumer_channel, provider_channel);
        transport.fail_next(config.scenario.fail_transport_cycles);

        log::info!(
            "network up: consumer {} ({}) on {} <-> provider {}",
            consumer_id,
            config.consumer.chain_id,
            consumer_channel,
            provider_channel
        );

        Ok(Self {
            consumer: ConsumerChain {
                keeper: consumer_keeper,
                bank: InMemoryLedger::new(),
                params: config.consumer.clone(),
                height: 0,
            },
            provider: ProviderChain {
                keeper: provider_keeper,
                bank: InMemoryLedger::new(),
                distribution: MemoryDistribution::new(),
                params: config.provider.clone(),
                height: 0,
            },
            transport,
            metrics: TandemMetrics::new()?,
            fees_per_block: config.fees_per_block()?,
        })
    }

    /// Produce one block on both chains.
    pub fn step(&mut self) -> SimResult<BlockSummary> {
        self.consumer.height += 1;
        self.provider.height += 1;
        let height = self.provider.height;

        let begin = self.provider.keeper.begin_block(
            height,
            &self.provider.params,
            &mut self.provider.bank,
            &mut self.provider.distribution,
        )?;
        self.metrics.record_begin_block(height, &begin);

        let relayed = self.relay()?;

        let height = self.consumer.height;
        if !self.fees_per_block.is_empty() {
            self.consumer
                .bank
                .deposit(FEE_COLLECTOR, &self.fees_per_block)?;
        }
        let end = self.consumer.keeper.end_block(
            height,
            &self.consumer.params,
            &mut self.consumer.bank,
            &mut self.transport,
        )?;
        self.metrics.record_end_block(height, &end);

        Ok(BlockSummary {
            height,
            transmission: end.transmission,
            delivered: relayed.delivered,
            rejected: relayed.rejected,
            timed_out: relayed.timed_out,
            allocations: begin.allocations.len(),
            settled: begin.settled,
        })
    }

    pub fn run(&mut self, blocks: u64) -> SimResult<Vec<BlockSummary>> {
        (0..blocks).map(|_| self.step()).collect()
    }

    fn relay(&mut self) -> SimResult<RelayOutcome> {
        let mut outcome = RelayOutcome::default();
        for flight in self.transport.drain() {
            let packet = &flight.packet;
            if packet.timeout_height != 0 && self.provider.height >= packet.timeout_height {
                log::warn!(
                    "packet {} timed out at provider height {}, refunding {}",
                    packet.sequence,
                    self.provider.height,
                    flight.amount
                );
                flight.refund(&mut self.consumer.bank)?;
                self.metrics.packets_timed_out_total.inc();
                outcome.timed_out += 1;
                continue;
            }

            let ack = match self.provider.keeper.receive(&mut self.provider.bank, packet) {
                Ok(receipt) => {
                    self.metrics.record_receipt(&receipt);
                    Acknowledgement::Success
                }
                Err(e) => Acknowledgement::Error(e.to_string()),
            };
            self.metrics.record_ack(&ack);
            if ack.is_success() {
                outcome.delivered += 1;
            } else {
                log::warn!(
                    "packet {} rejected by provider ({:?}), refunding {}",
                    packet.sequence,
                    ack,
                    flight.amount
                );
                flight.refund(&mut self.consumer.bank)?;
                outcome.rejected += 1;
            }
        }
        Ok(outcome)
    }

    /// Pay every consumer validator its commission out of distribution.
    pub fn withdraw_commissions(&mut self) -> SimResult<Coins> {
        let mut paid = Coins::new();
        for v in self
            .provider
            .keeper
            .consumer_validators(&self.consumer.params.consumer_id)?
        {
            let commission = self
                .provider
                .distribution
                .withdraw_validator_commission(&v.provider_cons_addr, v.commission_rate)?;
            if commission.is_empty() {
                continue;
            }
            self.provider
                .bank
                .transfer(DISTRIBUTION, v.provider_cons_addr.as_str(), &commission)?;
            log::info!("validator {} withdrew {} commission", v.provider_cons_addr, commission);
            paid = paid.checked_add(&commission)?;
        }
        Ok(paid)
    }

    pub fn report(&self) -> SimResult<SimReport> {
        let consumer_id = &self.consumer.params.consumer_id;
        let mut buckets = BTreeMap::new();
        for id in self.provider.keeper.launched_consumers()? {
            buckets.insert(id.clone(), self.provider.keeper.bucket(&id)?);
        }
        let mut outstanding_rewards = BTreeMap::new();
        for v in self.provider.keeper.consumer_validators(consumer_id)? {
            let rewards = self
                .provider
                .distribution
                .outstanding_rewards(&v.provider_cons_addr);
            outstanding_rewards.insert(v.provider_cons_addr.to_string(), rewards);
        }

        Ok(SimReport {
            consumer_height: self.consumer.height,
            provider_height: self.provider.height,
            last_transmission_height: self.consumer.keeper.last_transmission_height()?,
            in_flight: self.transport.in_flight(),
            consumer_balances: balances(&self.consumer.bank),
            provider_balances: balances(&self.provider.bank),
            buckets,
            outstanding_rewards,
            community_pool: self.provider.distribution.community_pool(),
        })
    }
}

fn balances(bank: &InMemoryLedger) -> BTreeMap<String, Coins> {
    bank.accounts()
        .map(|(account, coins)| (account.to_string(), coins.clone()))
        .collect()
}
