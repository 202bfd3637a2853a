// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS — tandem-consumer
//
// Schedule cadence and fee-split completeness for arbitrary inputs.
//
// Run: cargo test --release -p tandem-consumer --test prop_consumer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use proptest::prelude::*;
use tandem_consumer::{maybe_transmit, split};
use tandem_core::{Coins, Decimal256, Uint256};

fn arb_fraction() -> impl Strategy<Value = Decimal256> {
    (0u128..=1_000_000_000_000_000_000u128)
        .prop_map(|atomics| Decimal256::from_atomics(Uint256::from(atomics), 18).unwrap())
}

fn arb_fee_pool() -> impl Strategy<Value = Coins> {
    prop::collection::vec(("[a-z]{3,8}", any::<u128>()), 0..6).prop_map(|pairs| {
        let mut c = Coins::new();
        for (denom, amount) in pairs {
            // duplicate denoms would overflow u128 sums; keep the first
            if c.amount_of(&denom).is_zero() {
                c.add_amount(&denom, Uint256::from(amount)).unwrap();
            }
        }
        c
    })
}

// ─────────────────────────────────────────────────────────────────
// SCHEDULER
// ─────────────────────────────────────────────────────────────────

proptest! {
    /// PROPERTY: markers only ever land on initial + k * interval, whatever
    /// the outcome of the sends in between
    #[test]
    fn prop_marker_stays_on_cadence(
        initial in 0i64..10_000,
        interval in 1i64..500,
        blocks in 1i64..3_000,
    ) {
        let mut marker = initial;
        for height in initial..initial + blocks {
            let (due, next) = maybe_transmit(height, marker, interval);
            if due {
                prop_assert_eq!(next, marker + interval);
            } else {
                prop_assert_eq!(next, marker);
            }
            marker = next;
            prop_assert_eq!((marker - initial) % interval, 0);
        }
        // never more than one interval behind once caught up
        prop_assert!(initial + blocks - 1 - marker < interval);
    }

    /// PROPERTY: due exactly when a full interval has elapsed
    #[test]
    fn prop_due_iff_interval_elapsed(
        last in -1_000i64..1_000_000,
        elapsed in 0i64..100_000,
        interval in 1i64..10_000,
    ) {
        let (due, _) = maybe_transmit(last + elapsed, last, interval);
        prop_assert_eq!(due, elapsed >= interval);
    }
}

// ─────────────────────────────────────────────────────────────────
// SPLITTER
// ─────────────────────────────────────────────────────────────────

proptest! {
    /// PROPERTY: local + to_send == fee pool, per denom, exactly
    #[test]
    fn prop_split_is_complete(pool in arb_fee_pool(), fraction in arb_fraction()) {
        let (local, to_send) = split(&pool, fraction).unwrap();
        prop_assert_eq!(local.checked_add(&to_send).unwrap(), pool.clone());
        for (denom, amount) in pool.iter() {
            prop_assert!(local.amount_of(denom) <= amount);
        }
    }

    /// PROPERTY: fractions above one are rejected
    #[test]
    fn prop_split_rejects_large_fraction(extra in 1u128..1_000_000_000_000_000_000u128) {
        let fraction = Decimal256::one()
            + Decimal256::from_atomics(Uint256::from(extra), 18).unwrap();
        let pool: Coins = "10stake".parse().unwrap();
        prop_assert!(split(&pool, fraction).is_err());
    }
}
