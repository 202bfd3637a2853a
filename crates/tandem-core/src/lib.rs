// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - CORE MODULE
//
// Primitives shared by the consumer and provider reward engines: coin sets,
// addresses, denom traces, transfer messages, the ledger capability, consumer
// validator records and parameters.
// All reward arithmetic is fixed-point (Decimal256, 18 decimals); bank
// movements are whole Uint256 coins. No floating point anywhere.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod address;
pub mod coins;
pub mod denom;
pub mod error;
pub mod ledger;
pub mod packet;
pub mod params;
pub mod validator;

pub use address::Address;
pub use coins::{coins, dec_coins, to_decimal, Coins, DecCoins};
pub use cosmwasm_std::{Decimal256, Uint256};
pub use error::{CoreError, CoreResult};
pub use ledger::{InMemoryLedger, LedgerAccessor};
pub use packet::{Acknowledgement, RewardMemo, RewardTransfer, TransferPacket};
pub use params::{ConsumerParams, ProviderParams, TandemConfig};
pub use validator::ConsumerValidator;

/// Port bound by the token transfer application on both chains.
pub const TRANSFER_PORT: &str = "transfer";

/// Address prefixes
pub const PROVIDER_HRP: &str = "cosmos";
pub const CONSUMER_HRP: &str = "consumer";

// ─────────────────────────────────────────────────────────────────
// Module (pooled) account names
// ─────────────────────────────────────────────────────────────────

/// Consumer: fees collected during the block.
pub const FEE_COLLECTOR: &str = "fee_collector";
/// Consumer: share kept for local redistribution.
pub const CONS_REDISTRIBUTE: &str = "cons_redistribute";
/// Consumer: share waiting to be sent to the provider.
pub const CONS_TO_SEND_TO_PROVIDER: &str = "cons_to_send_to_provider";
/// Provider: receives consumer rewards before allocation.
pub const CONSUMER_REWARDS_POOL: &str = "consumer_rewards_pool";
/// Provider: holds allocated validator rewards and the community pool.
pub const DISTRIBUTION: &str = "distribution";

/// Bech32 address of the provider's consumer-rewards pool. Consumers send
/// rewards here; the bank books them under `CONSUMER_REWARDS_POOL`.
pub fn consumer_rewards_pool_address() -> Address {
    Address::module(PROVIDER_HRP, CONSUMER_REWARDS_POOL)
}

/// Ledger account holding escrowed value of a transfer channel end.
pub fn escrow_account(port: &str, channel: &str) -> String {
    format!("escrow/{}/{}", port, channel)
}
