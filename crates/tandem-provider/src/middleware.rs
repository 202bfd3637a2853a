// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - TRANSFER RECEIVE MIDDLEWARE
//
// Wraps token-transfer receipt on the provider. After the voucher is booked
// to the receiver, transfers addressed to the consumer-rewards pool are
// attributed to the sending consumer's bucket. The consumer is taken from
// the reward memo when present, otherwise from the channel it arrived on.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use tandem_core::denom::{provider_denom, receiver_chain_is_source};
use tandem_core::{
    consumer_rewards_pool_address, escrow_account, Acknowledgement, Coins,
    LedgerAccessor, RewardMemo, RewardTransfer, TransferPacket, CONSUMER_REWARDS_POOL,
};
use tandem_store::{KvStore, StoreCache};

use crate::error::ProviderResult;
use crate::keeper::ProviderKeeper;
use crate::reward_ledger;

/// Result of receiving one transfer, for callers that want more than the ack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receipt {
    /// Credited to `consumer_id`'s bucket under `denom`.
    Attributed { consumer_id: String, denom: String },
    /// Delivered, but not a consumer reward.
    Unrelated,
    /// Addressed to the rewards pool from an unidentifiable consumer.
    UnknownConsumer,
}

impl<S: KvStore> ProviderKeeper<S> {
    /// Handle an incoming transfer packet and produce its acknowledgement.
    pub fn on_recv_packet<L: LedgerAccessor>(
        &mut self,
        ledger: &mut L,
        packet: &TransferPacket,
    ) -> Acknowledgement {
        match self.receive(ledger, packet) {
            Ok(receipt) => {
                log::debug!(
                    "packet {} on {}: {:?}",
                    packet.sequence,
                    packet.destination_channel,
                    receipt
                );
                Acknowledgement::Success
            }
            Err(e) => {
                log::warn!(
                    "packet {} on {} rejected: {}",
                    packet.sequence,
                    packet.destination_channel,
                    e
                );
                Acknowledgement::Error(e.to_string())
            }
        }
    }

    pub fn receive<L: LedgerAccessor>(
        &mut self,
        ledger: &mut L,
        packet: &TransferPacket,
    ) -> ProviderResult<Receipt> {
        let data = RewardTransfer::from_bytes(&packet.data)?;
        let amount = reward_ledger::parse_amount(&data.amount)?;
        data.validate_basic()?;
        let whole = data.parsed_amount()?;

        let denom = provider_denom(
            &data.denom,
            &packet.source_port,
            &packet.source_channel,
            &packet.destination_port,
            &packet.destination_channel,
        );
        let to_rewards_pool = data.receiver == consumer_rewards_pool_address().as_str();
        let account = if to_rewards_pool {
            CONSUMER_REWARDS_POOL.to_string()
        } else {
            data.receiver.clone()
        };

        let mut cache = StoreCache::new(&mut self.store);
        let receipt = if !to_rewards_pool {
            log::debug!("transfer to {} is not a consumer reward", data.receiver);
            Receipt::Unrelated
        } else {
            match Self::identify_consumer(&cache, &data.memo, &packet.destination_channel)? {
                Some(consumer_id) => {
                    reward_ledger::credit(&mut cache, &consumer_id, &denom, amount)?;
                    log::info!(
                        "consumer {} rewards: +{}{}",
                        consumer_id,
                        data.amount,
                        denom
                    );
                    Receipt::Attributed {
                        consumer_id,
                        denom: denom.clone(),
                    }
                }
                None => {
                    log::error!(
                        "reward transfer of {}{} on {} from an unknown consumer",
                        data.amount,
                        denom,
                        packet.destination_channel
                    );
                    Receipt::UnknownConsumer
                }
            }
        };

        // book the coins: returning tokens leave escrow, foreign ones are minted
        let mut coins = Coins::new();
        coins.add_amount(&denom, whole)?;
        let unescrow =
            receiver_chain_is_source(&packet.source_port, &packet.source_channel, &data.denom);
        let escrow = escrow_account(&packet.destination_port, &packet.destination_channel);
        if unescrow {
            ledger.transfer(&escrow, &account, &coins)?;
        } else {
            ledger.deposit(&account, &coins)?;
        }

        // an unrecorded credit must not leave the coins booked
        if let Err(e) = cache.commit() {
            let reversed = if unescrow {
                ledger.transfer(&account, &escrow, &coins)
            } else {
                ledger.withdraw(&account, &coins)
            };
            if let Err(undo) = reversed {
                log::error!("could not reverse booking of {} to {}: {}", coins, account, undo);
            }
            return Err(e.into());
        }
        Ok(receipt)
    }

    fn identify_consumer<K: KvStore>(
        store: &K,
        memo: &str,
        channel: &str,
    ) -> ProviderResult<Option<String>> {
        if let Some(reward_memo) = RewardMemo::decode(memo) {
            if Self::is_launched_in(store, &reward_memo.consumer_id)? {
                return Ok(Some(reward_memo.consumer_id));
            }
            log::warn!(
                "reward memo names unknown consumer {}, falling back to channel {}",
                reward_memo.consumer_id,
                channel
            );
        }
        Self::consumer_for_channel_in(store, channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyStore;
    use tandem_core::denom::ibc_denom;
    use tandem_core::{Address, InMemoryLedger, Uint256, CONSUMER_HRP};
    use tandem_store::MemoryStore;

    fn keeper() -> ProviderKeeper<MemoryStore> {
        let mut k = ProviderKeeper::new(MemoryStore::new());
        k.launch_consumer("0").unwrap();
        k.register_transfer_channel("channel-2", "0").unwrap();
        k
    }

    fn packet(denom: &str, amount: &str, receiver: String, memo: String) -> TransferPacket {
        let data = RewardTransfer {
            denom: denom.into(),
            amount: amount.into(),
            sender: Address::module(CONSUMER_HRP, "cons_to_send_to_provider").to_string(),
            receiver,
            memo,
        };
        TransferPacket {
            sequence: 1,
            source_port: "transfer".into(),
            source_channel: "channel-5".into(),
            destination_port: "transfer".into(),
            destination_channel: "channel-2".into(),
            data: data.to_bytes().unwrap(),
            timeout_height: 0,
        }
    }

    fn pool() -> String {
        consumer_rewards_pool_address().to_string()
    }

    #[test]
    fn test_reward_attributed_by_channel() {
        let mut k = keeper();
        let mut bank = InMemoryLedger::new();
        let ack = k.on_recv_packet(&mut bank, &packet("stake", "100", pool(), String::new()));
        assert!(ack.is_success());

        let denom = ibc_denom("transfer", "channel-2", "stake");
        assert_eq!(k.bucket("0").unwrap().amount_of(&denom).to_string(), "100");
        assert_eq!(bank.balance(CONSUMER_REWARDS_POOL, &denom), Uint256::from(100u128));
    }

    #[test]
    fn test_reward_attributed_by_memo() {
        let mut k = keeper();
        k.launch_consumer("7").unwrap();
        let mut bank = InMemoryLedger::new();
        let memo = RewardMemo::new("7", "consumer-7").encode().unwrap();
        let receipt = k.receive(&mut bank, &packet("stake", "5", pool(), memo)).unwrap();
        assert!(matches!(receipt, Receipt::Attributed { ref consumer_id, .. } if consumer_id == "7"));
        assert!(k.bucket("0").unwrap().is_zero());
    }

    #[test]
    fn test_unrelated_transfer_is_booked_but_not_attributed() {
        let mut k = keeper();
        let mut bank = InMemoryLedger::new();
        let someone = Address::module("cosmos", "someone").to_string();
        let receipt = k
            .receive(&mut bank, &packet("stake", "5", someone.clone(), String::new()))
            .unwrap();
        assert_eq!(receipt, Receipt::Unrelated);
        assert!(k.bucket("0").unwrap().is_zero());
        let denom = ibc_denom("transfer", "channel-2", "stake");
        assert_eq!(bank.balance(&someone, &denom), Uint256::from(5u128));
    }

    #[test]
    fn test_unknown_channel_is_ignored() {
        let mut k = ProviderKeeper::new(MemoryStore::new());
        let mut bank = InMemoryLedger::new();
        let receipt = k
            .receive(&mut bank, &packet("stake", "5", pool(), String::new()))
            .unwrap();
        assert_eq!(receipt, Receipt::UnknownConsumer);
    }

    #[test]
    fn test_invalid_packet_gets_error_ack() {
        let mut k = keeper();
        let mut bank = InMemoryLedger::new();
        let mut p = packet("stake", "5", pool(), String::new());
        p.data = b"garbage".to_vec();
        assert!(!k.on_recv_packet(&mut bank, &p).is_success());

        let p = packet("stake", "-5", pool(), String::new());
        assert!(!k.on_recv_packet(&mut bank, &p).is_success());
        assert!(k.bucket("0").unwrap().is_zero());
    }

    #[test]
    fn test_failed_commit_reverses_booking() {
        let mut k = ProviderKeeper::new(FlakyStore::default());
        k.launch_consumer("0").unwrap();
        k.register_transfer_channel("channel-2", "0").unwrap();
        let escrow = escrow_account("transfer", "channel-2");
        let mut bank = InMemoryLedger::new();
        bank.deposit(&escrow, &tandem_core::coins(50, "uprov")).unwrap();

        k.store.fail_sets = true;
        let ack = k.on_recv_packet(&mut bank, &packet("stake", "100", pool(), String::new()));
        assert!(!ack.is_success());
        let p = packet("transfer/channel-5/uprov", "20", pool(), String::new());
        assert!(k.receive(&mut bank, &p).is_err());

        let voucher = ibc_denom("transfer", "channel-2", "stake");
        assert_eq!(bank.balance(CONSUMER_REWARDS_POOL, &voucher), Uint256::zero());
        assert_eq!(bank.balance(CONSUMER_REWARDS_POOL, "uprov"), Uint256::zero());
        assert_eq!(bank.balance(&escrow, "uprov"), Uint256::from(50u128));

        // redelivered once the store recovers, credited exactly once
        k.store.fail_sets = false;
        assert!(k.receive(&mut bank, &p).is_ok());
        assert_eq!(k.bucket("0").unwrap().amount_of("uprov").to_string(), "20");
        assert_eq!(bank.balance(CONSUMER_REWARDS_POOL, "uprov"), Uint256::from(20u128));
    }

    #[test]
    fn test_returning_token_unescrowed() {
        let mut k = keeper();
        let mut bank = InMemoryLedger::new();
        bank.deposit(&escrow_account("transfer", "channel-2"), &tandem_core::coins(50, "uprov"))
            .unwrap();

        let p = packet("transfer/channel-5/uprov", "20", pool(), String::new());
        k.receive(&mut bank, &p).unwrap();

        assert_eq!(k.bucket("0").unwrap().amount_of("uprov").to_string(), "20");
        assert_eq!(bank.balance(CONSUMER_REWARDS_POOL, "uprov"), Uint256::from(20u128));
        assert_eq!(
            bank.balance(&escrow_account("transfer", "channel-2"), "uprov"),
            Uint256::from(30u128)
        );
    }
}
