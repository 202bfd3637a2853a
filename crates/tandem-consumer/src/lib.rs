// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - CONSUMER REWARDS
//
// Fee splitting and fixed-cadence, retry-by-schedule transmission of the
// provider's share over the cross-chain transfer channel.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod error;
pub mod keeper;
pub mod scheduler;
pub mod sender;
pub mod splitter;

pub use error::{ConsumerError, ConsumerResult};
pub use keeper::{ConsumerKeeper, EndBlockReport, Transmission};
pub use scheduler::maybe_transmit;
pub use sender::{send_pending, Destination, Transport, TransportError};
pub use splitter::{distribute_fees, split};
