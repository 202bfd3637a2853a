// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - CONSUMER KEEPER
//
// End-of-block reward handling on the consumer chain:
// 1. split the block's fees into the local and provider shares
// 2. consult the transmission schedule and persist the advanced marker
// 3. if due, send the pending-outbound balance to the provider
//
// Missing channel and transport failures are logged and retried on the next
// scheduled cycle. A bad recipient address is returned to the caller.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use tandem_core::{
    Address, Coins, ConsumerParams, LedgerAccessor, RewardMemo, CONSUMER_HRP,
    CONS_TO_SEND_TO_PROVIDER,
};
use tandem_store::{keys, KvStore};

use crate::error::{ConsumerError, ConsumerResult};
use crate::scheduler::maybe_transmit;
use crate::sender::{send_pending, Destination, Transport};
use crate::splitter::distribute_fees;

/// What happened to the transmission step in one block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Transmission {
    NotDue,
    Sent { denoms: usize },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndBlockReport {
    pub kept_locally: Coins,
    pub queued_for_provider: Coins,
    pub transmission: Transmission,
}

pub struct ConsumerKeeper<S: KvStore> {
    store: S,
    chain_id: String,
}

impl<S: KvStore> ConsumerKeeper<S> {
    pub fn new(store: S, chain_id: &str) -> Self {
        Self {
            store,
            chain_id: chain_id.to_string(),
        }
    }

    /// Anchor the transmission schedule at `height`.
    pub fn init_genesis(&mut self, height: i64) -> ConsumerResult<()> {
        self.set_last_transmission_height(height)
    }

    /// Schedule marker; zero before genesis has anchored it.
    pub fn last_transmission_height(&self) -> ConsumerResult<i64> {
        let key = keys::schedule_marker(&self.chain_id)?;
        Ok(self.store.get_value(&key)?.unwrap_or(0))
    }

    fn set_last_transmission_height(&mut self, height: i64) -> ConsumerResult<()> {
        let key = keys::schedule_marker(&self.chain_id)?;
        self.store.set_value(&key, &height)?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn end_block<L, T>(
        &mut self,
        height: i64,
        params: &ConsumerParams,
        ledger: &mut L,
        transport: &mut T,
    ) -> ConsumerResult<EndBlockReport>
    where
        L: LedgerAccessor,
        T: Transport + ?Sized,
    {
        let (kept_locally, queued_for_provider) =
            distribute_fees(ledger, params.consumer_redistribution_fraction)?;

        let last = self.last_transmission_height()?;
        let (due, marker) = maybe_transmit(
            height,
            last,
            params.blocks_per_distribution_transmission,
        );
        let transmission = if due {
            self.set_last_transmission_height(marker)?;
            self.transmit(height, params, ledger, transport)?
        } else {
            Transmission::NotDue
        };

        Ok(EndBlockReport {
            kept_locally,
            queued_for_provider,
            transmission,
        })
    }

    fn transmit<L, T>(
        &mut self,
        height: i64,
        params: &ConsumerParams,
        ledger: &mut L,
        transport: &mut T,
    ) -> ConsumerResult<Transmission>
    where
        L: LedgerAccessor,
        T: Transport + ?Sized,
    {
        let sender = Address::module(CONSUMER_HRP, CONS_TO_SEND_TO_PROVIDER);
        let memo = RewardMemo::new(&params.consumer_id, &params.chain_id).encode()?;
        let timeout_height = if params.transfer_timeout_blocks > 0 {
            height.saturating_add(params.transfer_timeout_blocks)
        } else {
            0
        };
        let dest = Destination {
            channel: &params.distribution_transmission_channel,
            receiver: &params.provider_fee_pool_address,
            sender: &sender,
            memo: &memo,
            timeout_height,
        };

        let allowed = params.allowed_reward_denoms();
        match send_pending(ledger, transport, CONS_TO_SEND_TO_PROVIDER, &allowed, &dest) {
            Ok(0) => {
                log::info!(
                    "height {}: transmission due but no allowed reward denom has a balance",
                    height
                );
                Ok(Transmission::Skipped {
                    reason: "nothing to send".to_string(),
                })
            }
            Ok(denoms) => {
                log::info!(
                    "height {}: sent {} reward denom(s) to provider over {}",
                    height,
                    denoms,
                    params.distribution_transmission_channel
                );
                Ok(Transmission::Sent { denoms })
            }
            Err(e @ ConsumerError::NoChannel { .. }) => {
                log::info!("height {}: transmission skipped: {}", height, e);
                Ok(Transmission::Skipped {
                    reason: e.to_string(),
                })
            }
            Err(ConsumerError::Transport { denom, source }) => {
                log::warn!(
                    "height {}: transfer of {} to provider failed, retrying next cycle: {}",
                    height,
                    denom,
                    source
                );
                Ok(Transmission::Failed {
                    reason: source.to_string(),
                })
            }
            Err(e) => {
                log::error!("height {}: reward transmission aborted: {}", height, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::tests::RecordingTransport;
    use tandem_core::{coins, Decimal256, InMemoryLedger, Uint256, FEE_COLLECTOR};
    use tandem_store::MemoryStore;

    fn params() -> ConsumerParams {
        let mut p = ConsumerParams::default();
        p.blocks_per_distribution_transmission = 10;
        p.consumer_redistribution_fraction = Decimal256::percent(75);
        p.reward_denoms.insert("stake".into());
        p.distribution_transmission_channel = "channel-0".into();
        p.provider_fee_pool_address = tandem_core::consumer_rewards_pool_address().to_string();
        p
    }

    fn open_transport() -> RecordingTransport {
        RecordingTransport {
            open: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_end_block_splits_every_block() {
        let mut keeper = ConsumerKeeper::new(MemoryStore::new(), "consumer-1");
        let mut bank = InMemoryLedger::new();
        let mut transport = open_transport();
        bank.deposit(FEE_COLLECTOR, &coins(100, "stake")).unwrap();

        let report = keeper
            .end_block(3, &params(), &mut bank, &mut transport)
            .unwrap();
        assert_eq!(report.kept_locally, coins(75, "stake"));
        assert_eq!(report.queued_for_provider, coins(25, "stake"));
        assert_eq!(report.transmission, Transmission::NotDue);
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_end_block_sends_when_due_and_advances_marker() {
        let mut keeper = ConsumerKeeper::new(MemoryStore::new(), "consumer-1");
        keeper.init_genesis(0).unwrap();
        let mut bank = InMemoryLedger::new();
        let mut transport = open_transport();
        bank.deposit(FEE_COLLECTOR, &coins(100, "stake")).unwrap();

        let report = keeper
            .end_block(12, &params(), &mut bank, &mut transport)
            .unwrap();
        assert_eq!(report.transmission, Transmission::Sent { denoms: 1 });
        assert_eq!(keeper.last_transmission_height().unwrap(), 10);
        assert_eq!(transport.sent[0].amount, "25");
        let memo = RewardMemo::decode(&transport.sent[0].memo).unwrap();
        assert_eq!(memo.chain_id, "consumer-1");
    }

    #[test]
    fn test_transport_failure_advances_marker_and_keeps_balance() {
        let mut keeper = ConsumerKeeper::new(MemoryStore::new(), "consumer-1");
        let mut bank = InMemoryLedger::new();
        let mut transport = RecordingTransport {
            open: true,
            fail: true,
            ..Default::default()
        };
        bank.deposit(FEE_COLLECTOR, &coins(100, "stake")).unwrap();

        let report = keeper
            .end_block(10, &params(), &mut bank, &mut transport)
            .unwrap();
        assert!(matches!(report.transmission, Transmission::Failed { .. }));
        assert_eq!(keeper.last_transmission_height().unwrap(), 10);
        assert_eq!(
            bank.balance(CONS_TO_SEND_TO_PROVIDER, "stake"),
            Uint256::from(25u128)
        );
    }

    #[test]
    fn test_missing_channel_is_skipped() {
        let mut keeper = ConsumerKeeper::new(MemoryStore::new(), "consumer-1");
        let mut bank = InMemoryLedger::new();
        let mut transport = open_transport();
        let mut p = params();
        p.distribution_transmission_channel.clear();

        let report = keeper.end_block(10, &p, &mut bank, &mut transport).unwrap();
        assert!(matches!(report.transmission, Transmission::Skipped { .. }));
        assert_eq!(keeper.last_transmission_height().unwrap(), 10);
    }

    #[test]
    fn test_missing_recipient_surfaces_error() {
        let mut keeper = ConsumerKeeper::new(MemoryStore::new(), "consumer-1");
        let mut bank = InMemoryLedger::new();
        let mut transport = open_transport();
        let mut p = params();
        p.provider_fee_pool_address.clear();

        let err = keeper
            .end_block(10, &p, &mut bank, &mut transport)
            .unwrap_err();
        assert!(matches!(err, ConsumerError::NoRecipient { .. }));
        // the cadence still moved on
        assert_eq!(keeper.last_transmission_height().unwrap(), 10);
    }
}
