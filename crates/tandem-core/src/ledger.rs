// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - LEDGER ACCESS
//
// Narrow capability over the bank: balances of named pooled accounts, plus
// deposit/withdraw/transfer of whole coins. Reward logic only talks to this
// trait; the chain supplies the real bank, tests use InMemoryLedger.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use cosmwasm_std::Uint256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::coins::Coins;
use crate::error::{CoreError, CoreResult};

pub trait LedgerAccessor {
    fn balances(&self, account: &str) -> Coins;

    fn deposit(&mut self, account: &str, amount: &Coins) -> CoreResult<()>;

    /// Fails with `InsufficientFunds` and leaves the account untouched when
    /// any denomination is short.
    fn withdraw(&mut self, account: &str, amount: &Coins) -> CoreResult<()>;

    fn balance(&self, account: &str, denom: &str) -> Uint256 {
        self.balances(account).amount_of(denom)
    }

    /// Fails without moving anything when `from` is short or `to` would
    /// overflow.
    fn transfer(&mut self, from: &str, to: &str, amount: &Coins) -> CoreResult<()> {
        if amount.is_empty() {
            return Ok(());
        }
        self.balances(to).checked_add(amount)?;
        self.withdraw(from, amount)?;
        self.deposit(to, amount)
    }
}

/// BTreeMap-backed bank used by the simulator and tests.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct InMemoryLedger {
    accounts: BTreeMap<String, Coins>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every account, per denom. Used for supply checks.
    pub fn total_supply(&self) -> CoreResult<Coins> {
        self.accounts
            .values()
            .try_fold(Coins::new(), |acc, c| acc.checked_add(c))
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&str, &Coins)> {
        self.accounts.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl LedgerAccessor for InMemoryLedger {
    fn balances(&self, account: &str) -> Coins {
        self.accounts.get(account).cloned().unwrap_or_default()
    }

    fn deposit(&mut self, account: &str, amount: &Coins) -> CoreResult<()> {
        let updated = self.balances(account).checked_add(amount)?;
        self.accounts.insert(account.to_string(), updated);
        Ok(())
    }

    fn withdraw(&mut self, account: &str, amount: &Coins) -> CoreResult<()> {
        let updated = self
            .balances(account)
            .checked_sub(amount)
            .map_err(|e| match e {
                CoreError::InsufficientFunds {
                    available,
                    required,
                    ..
                } => CoreError::InsufficientFunds {
                    account: account.to_string(),
                    available,
                    required,
                },
                other => other,
            })?;
        if updated.is_empty() {
            self.accounts.remove(account);
        } else {
            self.accounts.insert(account.to_string(), updated);
        }
        Ok(())
    }
}
