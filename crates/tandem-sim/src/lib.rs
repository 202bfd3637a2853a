// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - SIMULATOR
//
// Runs a consumer and a provider side by side over a loopback transfer
// channel, with Prometheus counters for every stage of the reward pipeline.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod transport;

pub use config::{ScenarioConfig, SimConfig, SimValidator};
pub use error::{SimError, SimResult};
pub use metrics::TandemMetrics;
pub use network::{
    validator_address, BlockSummary, ConsumerChain, ProviderChain, SimReport, TwoChainNetwork,
};
pub use transport::{InFlight, LoopbackTransport};
