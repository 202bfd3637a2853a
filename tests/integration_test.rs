// ========================================
// INTEGRATION TESTS FOR TANDEM (XCR)
// ========================================
//
// Test Scenarios:
// 1. Even Split With Community Tax (4 and 3 validators)
// 2. Sub-Unit Remainder Stays In The Bucket
// 3. Credits Accumulate Until The Denom Is Allow-Listed
// 4. Transport Failures Retry On Schedule
// 5. Commission Withdrawal From Distribution
// 6. Keeper State Persistence (sled)
//
// Usage:
//   cargo test --test integration_test -- --nocapture
//
// ========================================

use tandem_consumer::{ConsumerKeeper, Transmission};
use tandem_core::denom::ibc_denom;
use tandem_core::{
    Decimal256, LedgerAccessor, Uint256, CONSUMER_REWARDS_POOL, CONS_TO_SEND_TO_PROVIDER,
    DISTRIBUTION,
};
use tandem_provider::{DistributionLedger, ProviderKeeper};
use tandem_sim::{validator_address, SimConfig, SimValidator, TwoChainNetwork};
use tandem_store::{MemoryStore, SledStore};

// ========================================
// HELPERS
// ========================================

fn dec(s: &str) -> Decimal256 {
    s.parse().unwrap()
}

fn voucher() -> String {
    ibc_denom("transfer", "channel-0", "stake")
}

/// Every block sends 100stake of fees to the provider; validators are
/// eligible from genesis.
fn config(validators: usize, tax: &str, fees: &str) -> SimConfig {
    let mut config = SimConfig::default();
    config.consumer.blocks_per_distribution_transmission = 1;
    config.provider.number_of_epochs_to_start_receiving_rewards = 0;
    config.provider.community_tax = dec(tax);
    config.scenario.fees_per_block = fees.to_string();
    config.scenario.validators = (0..validators)
        .map(|i| SimValidator {
            name: format!("val-{}", i),
            voting_power: 10,
            join_height: 0,
            commission_rate: Decimal256::percent(5),
        })
        .collect();
    config
}

fn network(config: &SimConfig) -> TwoChainNetwork<MemoryStore> {
    TwoChainNetwork::new(config, MemoryStore::new(), MemoryStore::new()).unwrap()
}

fn outstanding(net: &TwoChainNetwork<MemoryStore>, name: &str) -> Decimal256 {
    net.provider
        .distribution
        .outstanding_rewards(&validator_address(name))
        .amount_of(&voucher())
}

// ========================================
// TEST 1: EVEN SPLIT WITH COMMUNITY TAX
// ========================================
#[test]
fn test_four_validators_share_after_community_tax() {
    println!("\n🧪 TEST 1: 100 units, 4 validators, 10% community tax");

    let mut net = network(&config(4, "0.1", "400stake"));
    // block 1 sends, block 2 delivers, block 3 allocates
    net.run(3).unwrap();

    for i in 0..4 {
        assert_eq!(outstanding(&net, &format!("val-{}", i)), dec("22.5"));
    }
    assert_eq!(
        net.provider.distribution.community_pool().amount_of(&voucher()),
        dec("10")
    );
    // the block 3 arrival waits for the next round
    assert_eq!(
        net.provider.keeper.bucket("0").unwrap().amount_of(&voucher()),
        dec("100")
    );

    // settled coins moved out of the rewards pool
    assert_eq!(
        net.provider.bank.balance(DISTRIBUTION, &voucher()),
        Uint256::from(100u128)
    );
    assert_eq!(
        net.provider.bank.balance(CONSUMER_REWARDS_POOL, &voucher()),
        Uint256::from(100u128)
    );
    println!("✅ 22.5 per validator, 10 to community pool");
}

#[test]
fn test_three_validators_share_after_community_tax() {
    let mut net = network(&config(3, "0.1", "400stake"));
    net.run(3).unwrap();

    for i in 0..3 {
        assert_eq!(outstanding(&net, &format!("val-{}", i)), dec("30"));
    }
}

// ========================================
// TEST 2: SUB-UNIT REMAINDER
// ========================================
#[test]
fn test_indivisible_remainder_stays_in_bucket() {
    println!("\n🧪 TEST 2: 91 units over 3 validators");

    // 364stake fees: 273 kept locally, 91 to the provider
    let mut net = network(&config(3, "0", "364stake"));

    // a single transmission, then nothing more arrives
    net.step().unwrap();
    net.consumer.params.blocks_per_distribution_transmission = 1000;
    net.run(2).unwrap();

    let share = dec("30.333333333333333333");
    for i in 0..3 {
        assert_eq!(outstanding(&net, &format!("val-{}", i)), share);
    }
    assert_eq!(
        net.provider.keeper.bucket("0").unwrap().amount_of(&voucher()),
        dec("0.000000000000000001")
    );
    // 90.999.. distributed: 90 whole coins settled, the fraction is carried
    assert_eq!(
        net.provider.bank.balance(DISTRIBUTION, &voucher()),
        Uint256::from(90u128)
    );
    assert_eq!(
        net.provider.keeper.settlement_carry(&voucher()).unwrap(),
        dec("0.999999999999999999")
    );
    println!("✅ 1e-18 retained for the next round");
}

// ========================================
// TEST 3: ALLOW-LIST GATING
// ========================================
#[test]
fn test_credits_accumulate_until_allow_listed() {
    println!("\n🧪 TEST 3: 5 credits of 100 before the denom is allowed");

    let mut config = config(4, "0.02", "400stake");
    config.scenario.allow_consumer_denoms = false;
    let mut net = network(&config);

    // arrivals at blocks 2..=6
    let summaries = net.run(6).unwrap();
    assert!(summaries.iter().all(|s| s.allocations == 0));
    assert_eq!(
        net.provider.keeper.bucket("0").unwrap().amount_of(&voucher()),
        dec("500")
    );
    assert!(net
        .provider
        .distribution
        .outstanding_rewards(&validator_address("val-0"))
        .is_zero());

    net.provider
        .keeper
        .set_consumer_reward_denom(&voucher())
        .unwrap();
    let summary = net.step().unwrap();
    assert_eq!(summary.allocations, 1);

    // floor(500 * 0.02) = 10 to the community, 490 / 4 each
    for i in 0..4 {
        assert_eq!(outstanding(&net, &format!("val-{}", i)), dec("122.5"));
    }
    println!("✅ accumulated 500 allocated in one round");
}

// ========================================
// TEST 4: TRANSPORT FAILURE RETRY
// ========================================
#[test]
fn test_transport_failures_retry_on_schedule() {
    println!("\n🧪 TEST 4: 3 failed cycles, then recovery");

    let mut config = config(4, "0.02", "400stake");
    config.consumer.blocks_per_distribution_transmission = 10;
    config.scenario.fail_transport_cycles = 3;
    let mut net = network(&config);

    for cycle in 1..=3i64 {
        let summaries = net.run(10).unwrap();
        assert!(matches!(
            summaries[9].transmission,
            Transmission::Failed { .. }
        ));
        // marker moves on, pending keeps everything collected so far
        assert_eq!(
            net.consumer.keeper.last_transmission_height().unwrap(),
            cycle * 10
        );
        assert_eq!(
            net.consumer.bank.balance(CONS_TO_SEND_TO_PROVIDER, "stake"),
            Uint256::from(cycle as u128 * 1000)
        );
        assert_eq!(net.transport.in_flight(), 0);
    }

    let summaries = net.run(10).unwrap();
    assert_eq!(summaries[9].transmission, Transmission::Sent { denoms: 1 });
    assert_eq!(
        net.consumer.bank.balance(CONS_TO_SEND_TO_PROVIDER, "stake"),
        Uint256::zero()
    );

    let summary = net.step().unwrap();
    assert_eq!(summary.delivered, 1);
    assert_eq!(
        net.provider.keeper.bucket("0").unwrap().amount_of(&voucher()),
        dec("4000")
    );
    assert_eq!(net.metrics.transmissions_failed_total.get(), 3);
    println!("✅ 4000 delivered on the 4th cycle");
}

// ========================================
// TEST 5: COMMISSION WITHDRAWAL
// ========================================
#[test]
fn test_commission_withdrawal_pays_from_distribution() {
    println!("\n🧪 TEST 5: 5% commission withdrawal");

    let mut net = network(&config(4, "0.1", "400stake"));
    net.run(3).unwrap();

    // floor(22.5 * 0.05) = 1 per validator
    let paid = net.withdraw_commissions().unwrap();
    assert_eq!(paid.amount_of(&voucher()), Uint256::from(4u128));
    assert_eq!(outstanding(&net, "val-0"), dec("21.5"));
    assert_eq!(
        net.provider
            .bank
            .balance(validator_address("val-0").as_str(), &voucher()),
        Uint256::from(1u128)
    );
    assert_eq!(
        net.provider.bank.balance(DISTRIBUTION, &voucher()),
        Uint256::from(96u128)
    );

    // the report agrees with the ledgers
    let report = net.report().unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["provider_height"], 3);
    assert_eq!(report.outstanding_rewards.len(), 4);
    println!("✅ commission paid out of settled coins");
}

// ========================================
// TEST 6: PERSISTENCE
// ========================================
#[test]
fn test_keeper_state_survives_reopen() {
    println!("\n🧪 TEST 6: sled-backed keepers");

    let dir = tempfile::tempdir().unwrap();
    let config = SimConfig::default();
    {
        let consumer = SledStore::open(dir.path().join("consumer")).unwrap();
        let provider = SledStore::open(dir.path().join("provider")).unwrap();
        let mut net = TwoChainNetwork::new(&config, consumer, provider).unwrap();
        net.run(11).unwrap();
        net.consumer.keeper.store().flush().unwrap();
        net.provider.keeper.store().flush().unwrap();
    }

    let consumer = ConsumerKeeper::new(
        SledStore::open(dir.path().join("consumer")).unwrap(),
        &config.consumer.chain_id,
    );
    assert_eq!(consumer.last_transmission_height().unwrap(), 10);

    let provider = ProviderKeeper::new(SledStore::open(dir.path().join("provider")).unwrap());
    assert!(provider.is_launched("0").unwrap());
    assert_eq!(
        provider.consumer_for_channel("channel-0").unwrap(),
        Some("0".to_string())
    );
    // 10 blocks x 250stake delivered at block 11
    assert_eq!(
        provider.bucket("0").unwrap().amount_of(&voucher()),
        dec("2500")
    );
    println!("✅ marker, registry and bucket reloaded");
}
