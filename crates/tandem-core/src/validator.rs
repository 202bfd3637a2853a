use cosmwasm_std::Decimal256;
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Membership of a provider validator in a consumer chain's validator set.
/// Written by the validator-set tracker; reward code only reads it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConsumerValidator {
    pub consumer_id: String,
    pub provider_cons_addr: Address,
    pub voting_power: i64,
    /// Provider height at which the validator started validating the consumer.
    pub join_height: i64,
    pub commission_rate: Decimal256,
}

impl ConsumerValidator {
    /// Tenure rule: `height - join_height >= eligibility_blocks`.
    pub fn is_eligible(&self, height: i64, eligibility_blocks: i64) -> bool {
        height.saturating_sub(self.join_height) >= eligibility_blocks
    }
}
