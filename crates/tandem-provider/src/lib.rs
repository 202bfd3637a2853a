// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - PROVIDER REWARDS
//
// Attribution of consumer rewards arriving over the transfer channel, the
// denom allow-list, per-consumer buckets and the tenure-gated allocation of
// bucket contents to consumer validators and the community pool.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod allocation;
pub mod denom_gate;
pub mod distribution;
pub mod error;
pub mod keeper;
pub mod middleware;
pub mod reward_ledger;

#[cfg(test)]
mod testing;

pub use allocation::{allocate, eligible_validators, Allocation};
pub use distribution::{DistributionLedger, MemoryDistribution, StagedCredits};
pub use error::{ProviderError, ProviderResult};
pub use keeper::{AllocationRecord, BeginBlockReport, ProviderKeeper};
pub use middleware::Receipt;
