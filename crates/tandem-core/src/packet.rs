// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - REWARD TRANSFER MESSAGES
//
// Consumer → provider token transfer payload, the memo that tags it as
// consumer rewards, and the packet envelope the transport delivers.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use cosmwasm_std::Uint256;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::address::Address;
use crate::denom::validate_denom;
use crate::error::{CoreError, CoreResult};

/// Free-text part of the reward memo.
pub const REWARD_MEMO_TEXT: &str = "ICS rewards";

/// Token transfer payload. `amount` travels as a decimal string so the full
/// 256-bit range survives any encoding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RewardTransfer {
    pub denom: String,
    pub amount: String,
    pub sender: String,
    pub receiver: String,
    #[serde(default)]
    pub memo: String,
}

impl RewardTransfer {
    /// Stateless checks run before handing the message to the transport.
    pub fn validate_basic(&self) -> CoreResult<()> {
        Address::parse(&self.sender)?;
        Address::parse(&self.receiver)?;
        validate_denom(&self.denom)?;
        let amount = self.parsed_amount()?;
        if amount.is_zero() {
            return Err(CoreError::MalformedPacket("zero transfer amount".into()));
        }
        Ok(())
    }

    pub fn parsed_amount(&self) -> CoreResult<Uint256> {
        Uint256::from_str(&self.amount)
            .map_err(|_| CoreError::MalformedPacket(format!("invalid amount '{}'", self.amount)))
    }

    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| CoreError::MalformedPacket(e.to_string()))
    }
}

/// `{"provider":{"consumerId":..,"chainId":..,"memo":..}}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RewardMemo {
    #[serde(rename = "consumerId")]
    pub consumer_id: String,
    #[serde(rename = "chainId")]
    pub chain_id: String,
    pub memo: String,
}

#[derive(Serialize, Deserialize)]
struct MemoEnvelope {
    provider: RewardMemo,
}

impl RewardMemo {
    pub fn new(consumer_id: &str, chain_id: &str) -> Self {
        Self {
            consumer_id: consumer_id.to_string(),
            chain_id: chain_id.to_string(),
            memo: REWARD_MEMO_TEXT.to_string(),
        }
    }

    pub fn encode(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(&MemoEnvelope {
            provider: self.clone(),
        })?)
    }

    /// `None` when the memo is not a reward memo (plain text, other JSON).
    pub fn decode(memo: &str) -> Option<Self> {
        serde_json::from_str::<MemoEnvelope>(memo)
            .ok()
            .map(|env| env.provider)
            .filter(|m| !m.consumer_id.is_empty())
    }
}

/// Transport envelope as seen by the receiving chain.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransferPacket {
    pub sequence: u64,
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    pub data: Vec<u8>,
    /// Block height on the destination after which the packet is void.
    /// Zero disables the height timeout.
    pub timeout_height: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    Success,
    Error(String),
}

impl Acknowledgement {
    pub fn is_success(&self) -> bool {
        matches!(self, Acknowledgement::Success)
    }
}
