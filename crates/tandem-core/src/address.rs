// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - ADDRESSES
//
// Bech32-shaped account addresses: `<hrp>1<data>`, lowercase, data drawn
// from the bech32 charset. Module (pooled) accounts derive their data part
// from SHA-256 of the module name so every node computes the same address.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CoreError, CoreResult};

const BECH32_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const MIN_DATA_LEN: usize = 6;
const MAX_ADDRESS_LEN: usize = 90;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Structural validation only; the checksum is not verified.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let invalid = |reason: &'static str| CoreError::InvalidAddress {
            address: raw.to_string(),
            reason,
        };
        if raw.trim().is_empty() {
            return Err(invalid("empty address"));
        }
        if raw.len() > MAX_ADDRESS_LEN {
            return Err(invalid("address too long"));
        }
        if raw.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(invalid("address must be lowercase"));
        }
        let sep = raw
            .rfind('1')
            .ok_or_else(|| invalid("missing separator"))?;
        let (hrp, data) = (&raw[..sep], &raw[sep + 1..]);
        if hrp.is_empty() || !hrp.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(invalid("invalid human-readable prefix"));
        }
        if data.len() < MIN_DATA_LEN {
            return Err(invalid("data part too short"));
        }
        if !data.bytes().all(|b| BECH32_CHARSET.contains(&b)) {
            return Err(invalid("data part outside bech32 charset"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Deterministic address for a named module account.
    pub fn module(hrp: &str, module_name: &str) -> Self {
        let digest = Sha256::digest(module_name.as_bytes());
        let data: String = digest
            .iter()
            .map(|b| BECH32_CHARSET[(*b & 0x1f) as usize] as char)
            .collect();
        Self(format!("{}1{}", hrp, data))
    }

    pub fn hrp(&self) -> &str {
        // validated on construction, the separator is always present
        self.0.rfind('1').map(|i| &self.0[..i]).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let a = Address::parse("cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu").unwrap();
        assert_eq!(a.hrp(), "cosmos");
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("   ").is_err());
        assert!(Address::parse("notanaddress").is_err());
        assert!(Address::parse("cosmos1bbbbbbbb").is_err()); // 'b' not in charset
        assert!(Address::parse("Cosmos1qypqxpq9").is_err());
        assert!(Address::parse("1qypqxpq9qcrs").is_err());
    }

    #[test]
    fn test_module_address_is_deterministic_and_valid() {
        let a = Address::module("cosmos", "consumer_rewards_pool");
        let b = Address::module("cosmos", "consumer_rewards_pool");
        assert_eq!(a, b);
        assert!(Address::parse(a.as_str()).is_ok());
        assert_ne!(a, Address::module("cosmos", "distribution"));
    }
}
