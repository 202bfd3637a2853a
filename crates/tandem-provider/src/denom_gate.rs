//! Allow-list of consumer reward denoms. Only listed denoms leave a
//! consumer's bucket; unlisted ones keep accumulating until listed.

use std::collections::BTreeSet;
use tandem_core::denom::validate_denom;
use tandem_store::{keys, KvStore};

use crate::error::ProviderResult;

pub fn is_allowed<S: KvStore>(store: &S, denom: &str) -> ProviderResult<bool> {
    Ok(store.has(&keys::allowlist_denom(denom)?)?)
}

pub fn allow<S: KvStore>(store: &mut S, denom: &str) -> ProviderResult<()> {
    validate_denom(denom)?;
    store.set_value(&keys::allowlist_denom(denom)?, &true)?;
    Ok(())
}

pub fn disallow<S: KvStore>(store: &mut S, denom: &str) -> ProviderResult<()> {
    store.remove(&keys::allowlist_denom(denom)?)?;
    Ok(())
}

pub fn allowed_denoms<S: KvStore>(store: &S) -> ProviderResult<BTreeSet<String>> {
    Ok(store
        .scan_values::<bool>(&[keys::ALLOWLIST_DENOM])?
        .into_iter()
        .filter_map(|(mut parts, _)| parts.pop())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_store::MemoryStore;

    #[test]
    fn test_empty_by_default() {
        let store = MemoryStore::new();
        assert!(!is_allowed(&store, "stake").unwrap());
        assert!(allowed_denoms(&store).unwrap().is_empty());
    }

    #[test]
    fn test_allow_and_disallow() {
        let mut store = MemoryStore::new();
        allow(&mut store, "stake").unwrap();
        allow(&mut store, "ibc/3C3D7B3BE4ECC85A0E5B52A3AEC3B7DFC2AA9CA47C37821E57020D6807043BE9").unwrap();
        assert!(is_allowed(&store, "stake").unwrap());
        assert_eq!(allowed_denoms(&store).unwrap().len(), 2);

        disallow(&mut store, "stake").unwrap();
        assert!(!is_allowed(&store, "stake").unwrap());
    }

    #[test]
    fn test_rejects_invalid_denom() {
        let mut store = MemoryStore::new();
        assert!(allow(&mut store, "7x").is_err());
    }
}
