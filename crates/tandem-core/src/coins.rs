// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - COIN SETS
//
// Coins:    integer amounts per denomination (bank balances, transfers)
// DecCoins: 18-decimal fixed-point amounts per denomination (reward buckets,
//           outstanding rewards, community pool)
//
// Both are kept sorted by denom with zero entries removed, so equality is
// structural and iteration order is deterministic across nodes.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use cosmwasm_std::{Decimal256, Uint256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::denom::validate_denom;
use crate::error::{CoreError, CoreResult};

/// Build a single-denom `Coins`.
pub fn coins(amount: u128, denom: &str) -> Coins {
    let mut c = Coins::new();
    c.set(denom, Uint256::from(amount));
    c
}

/// Build a single-denom `DecCoins` from a decimal string such as `"22.5"`.
pub fn dec_coins(amount: &str, denom: &str) -> CoreResult<DecCoins> {
    let value = Decimal256::from_str(amount).map_err(|_| CoreError::InvalidCoins {
        input: format!("{}{}", amount, denom),
    })?;
    let mut c = DecCoins::new();
    c.set(denom, value);
    Ok(c)
}

/// Lift an integer amount into the 18-decimal domain.
pub fn to_decimal(amount: Uint256) -> CoreResult<Decimal256> {
    Ok(Decimal256::from_atomics(amount, 0)?)
}

// ─────────────────────────────────────────────────────────────────
// Coins
// ─────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Coins(BTreeMap<String, Uint256>);

impl Coins {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    fn set(&mut self, denom: &str, amount: Uint256) {
        if amount.is_zero() {
            self.0.remove(denom);
        } else {
            self.0.insert(denom.to_string(), amount);
        }
    }

    pub fn amount_of(&self, denom: &str) -> Uint256 {
        self.0.get(denom).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn denoms(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Uint256)> {
        self.0.iter().map(|(d, a)| (d.as_str(), *a))
    }

    pub fn add_amount(&mut self, denom: &str, amount: Uint256) -> CoreResult<()> {
        let sum = self.amount_of(denom).checked_add(amount)?;
        self.set(denom, sum);
        Ok(())
    }

    pub fn checked_add(&self, other: &Coins) -> CoreResult<Coins> {
        let mut out = self.clone();
        for (denom, amount) in other.iter() {
            out.add_amount(denom, amount)?;
        }
        Ok(out)
    }

    /// Subtract `other` denomination by denomination. Fails without partial
    /// effect if any denomination would go negative.
    pub fn checked_sub(&self, other: &Coins) -> CoreResult<Coins> {
        let mut out = self.clone();
        for (denom, amount) in other.iter() {
            let have = out.amount_of(denom);
            let left = have
                .checked_sub(amount)
                .map_err(|_| CoreError::InsufficientFunds {
                    account: String::new(),
                    available: format!("{}{}", have, denom),
                    required: format!("{}{}", amount, denom),
                })?;
            out.set(denom, left);
        }
        Ok(out)
    }

    /// Keep only the denominations accepted by `keep`.
    pub fn filter<F: Fn(&str) -> bool>(&self, keep: F) -> Coins {
        Coins(
            self.0
                .iter()
                .filter(|(d, _)| keep(d))
                .map(|(d, a)| (d.clone(), *a))
                .collect(),
        )
    }

    /// `true` when every denomination of `other` is covered by `self`.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.iter().all(|(d, a)| self.amount_of(d) >= a)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "0");
        }
        let parts: Vec<String> = self.iter().map(|(d, a)| format!("{}{}", a, d)).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Parses `"100stake,5uatom"`.
impl FromStr for Coins {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = Coins::new();
        if s.trim().is_empty() {
            return Ok(out);
        }
        for part in s.split(',') {
            let part = part.trim();
            let split = part
                .find(|c: char| !c.is_ascii_digit())
                .ok_or_else(|| CoreError::InvalidCoins {
                    input: s.to_string(),
                })?;
            let (amount, denom) = part.split_at(split);
            if amount.is_empty() {
                return Err(CoreError::InvalidCoins {
                    input: s.to_string(),
                });
            }
            validate_denom(denom)?;
            let amount = Uint256::from_str(amount).map_err(|_| CoreError::InvalidCoins {
                input: s.to_string(),
            })?;
            out.add_amount(denom, amount)?;
        }
        Ok(out)
    }
}

// ─────────────────────────────────────────────────────────────────
// DecCoins
// ─────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DecCoins(BTreeMap<String, Decimal256>);

impl DecCoins {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_coins(coins: &Coins) -> CoreResult<Self> {
        let mut out = DecCoins::new();
        for (denom, amount) in coins.iter() {
            out.set(denom, to_decimal(amount)?);
        }
        Ok(out)
    }

    pub fn set(&mut self, denom: &str, amount: Decimal256) {
        if amount.is_zero() {
            self.0.remove(denom);
        } else {
            self.0.insert(denom.to_string(), amount);
        }
    }

    pub fn amount_of(&self, denom: &str) -> Decimal256 {
        self.0.get(denom).copied().unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn denoms(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal256)> {
        self.0.iter().map(|(d, a)| (d.as_str(), *a))
    }

    pub fn add_amount(&mut self, denom: &str, amount: Decimal256) -> CoreResult<()> {
        let sum = self.amount_of(denom).checked_add(amount)?;
        self.set(denom, sum);
        Ok(())
    }

    pub fn checked_add(&self, other: &DecCoins) -> CoreResult<DecCoins> {
        let mut out = self.clone();
        for (denom, amount) in other.iter() {
            out.add_amount(denom, amount)?;
        }
        Ok(out)
    }

    pub fn checked_sub(&self, other: &DecCoins) -> CoreResult<DecCoins> {
        let mut out = self.clone();
        for (denom, amount) in other.iter() {
            let have = out.amount_of(denom);
            let left = have
                .checked_sub(amount)
                .map_err(|_| CoreError::InsufficientFunds {
                    account: String::new(),
                    available: format!("{}{}", have, denom),
                    required: format!("{}{}", amount, denom),
                })?;
            out.set(denom, left);
        }
        Ok(out)
    }

    /// Multiply every amount by `factor`, truncating at 18 decimals.
    pub fn mul_dec(&self, factor: Decimal256) -> CoreResult<DecCoins> {
        let mut out = DecCoins::new();
        for (denom, amount) in self.iter() {
            out.set(denom, amount.checked_mul(factor)?);
        }
        Ok(out)
    }

    /// Split into whole coins and the fractional change left behind.
    pub fn truncate(&self) -> (Coins, DecCoins) {
        let mut whole = Coins::new();
        let mut change = DecCoins::new();
        for (denom, amount) in self.iter() {
            let floor = amount.floor();
            whole.set(denom, amount.to_uint_floor());
            // floor <= amount, never underflows
            change.set(denom, amount - floor);
        }
        (whole, change)
    }
}

impl fmt::Display for DecCoins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "0");
        }
        let parts: Vec<String> = self.iter().map(|(d, a)| format!("{}{}", a, d)).collect();
        write!(f, "{}", parts.join(","))
    }
}
