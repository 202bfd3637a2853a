// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS — tandem-store
//
// Run: cargo test --release -p tandem-store --test prop_store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use proptest::prelude::*;
use tandem_store::{keys, KvStore, MemoryStore, StoreCache};

proptest! {
    /// PROPERTY: decompose(compose(x)) == x for any components
    #[test]
    fn prop_key_components_survive(consumer in ".{0,40}", denom in ".{0,80}") {
        let key = keys::reward_bucket(&consumer, &denom).unwrap();
        let (prefix, parts) = keys::decompose(&key).unwrap();
        prop_assert_eq!(prefix, keys::REWARD_BUCKET);
        prop_assert_eq!(parts, vec![consumer, denom]);
    }

    /// PROPERTY: writes through a committed cache leave the store exactly as
    /// if they had been applied directly
    #[test]
    fn prop_committed_cache_matches_direct_writes(
        ops in prop::collection::vec((0u8..8, any::<bool>(), any::<u8>()), 0..40),
    ) {
        let mut direct = MemoryStore::new();
        let mut cached = MemoryStore::new();
        {
            let mut cache = StoreCache::new(&mut cached);
            for (k, is_set, v) in &ops {
                let key = [b'k', *k];
                if *is_set {
                    direct.set(&key, vec![*v]).unwrap();
                    cache.set(&key, vec![*v]).unwrap();
                } else {
                    direct.remove(&key).unwrap();
                    cache.remove(&key).unwrap();
                }
            }
            prop_assert_eq!(cache.scan_prefix(b"k").unwrap(), direct.scan_prefix(b"k").unwrap());
            cache.commit().unwrap();
        }
        prop_assert_eq!(cached.scan_prefix(b"").unwrap(), direct.scan_prefix(b"").unwrap());
    }
}
