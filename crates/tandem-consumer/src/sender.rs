// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - CROSS-CHAIN SENDER
//
// Moves the pending-outbound balance to the provider over the transmission
// channel, one transfer per allowed denom. A cycle is all-or-nothing: when
// the transport rejects one denom, the transfers already emitted in the same
// cycle are cancelled and their escrow returned.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::BTreeSet;
use thiserror::Error;

use tandem_core::{Address, CoreError, LedgerAccessor, RewardTransfer, TRANSFER_PORT};

use crate::error::{ConsumerError, ConsumerResult};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("channel {channel} is closed")]
    ChannelClosed { channel: String },

    #[error("no counterparty for channel {channel}")]
    NoCounterparty { channel: String },

    #[error("transfer rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Ledger(#[from] CoreError),
}

/// Token transfer application as seen from the consumer.
pub trait Transport {
    fn channel_open(&self, port: &str, channel: &str) -> bool;

    /// Escrow `transfer` out of `sender_account` and emit the packet.
    /// Returns the packet sequence. On `Err` the sender's balance is unchanged.
    fn send_transfer(
        &mut self,
        ledger: &mut dyn LedgerAccessor,
        sender_account: &str,
        source_channel: &str,
        transfer: RewardTransfer,
        timeout_height: i64,
    ) -> Result<u64, TransportError>;

    /// Withdraw a packet emitted earlier in the same block and return its
    /// escrow to the original sender account.
    fn cancel_transfer(
        &mut self,
        ledger: &mut dyn LedgerAccessor,
        sequence: u64,
    ) -> Result<(), TransportError>;
}

/// Destination and envelope of one transmission cycle.
#[derive(Debug, Clone)]
pub struct Destination<'a> {
    pub channel: &'a str,
    pub receiver: &'a str,
    pub sender: &'a Address,
    pub memo: &'a str,
    pub timeout_height: i64,
}

/// Send every allowed denom with a nonzero balance in `pending_account`.
///
/// Returns the number of denoms sent. `NoChannel` and `NoRecipient` are
/// detected before anything moves. On a transport failure every transfer of
/// this cycle is cancelled, so the pending balance is exactly as it was.
pub fn send_pending<L, T>(
    ledger: &mut L,
    transport: &mut T,
    pending_account: &str,
    allowed_denoms: &BTreeSet<String>,
    dest: &Destination<'_>,
) -> ConsumerResult<usize>
where
    L: LedgerAccessor,
    T: Transport + ?Sized,
{
    if dest.channel.is_empty() || !transport.channel_open(TRANSFER_PORT, dest.channel) {
        return Err(ConsumerError::NoChannel {
            channel: dest.channel.to_string(),
        });
    }
    if let Err(e) = Address::parse(dest.receiver) {
        return Err(no_recipient(dest.receiver, e));
    }

    let pending = ledger.balances(pending_account);
    let mut transfers = Vec::new();
    for (denom, amount) in pending.iter() {
        if !allowed_denoms.contains(denom) {
            continue;
        }
        let transfer = RewardTransfer {
            denom: denom.to_string(),
            amount: amount.to_string(),
            sender: dest.sender.to_string(),
            receiver: dest.receiver.to_string(),
            memo: dest.memo.to_string(),
        };
        transfer.validate_basic().map_err(|e| match e {
            CoreError::InvalidAddress { .. } => no_recipient(dest.receiver, e),
            other => ConsumerError::Core(other),
        })?;
        transfers.push(transfer);
    }

    let mut emitted: Vec<u64> = Vec::with_capacity(transfers.len());
    for transfer in transfers {
        let denom = transfer.denom.clone();
        let amount = transfer.amount.clone();
        match transport.send_transfer(
            &mut *ledger,
            pending_account,
            dest.channel,
            transfer,
            dest.timeout_height,
        ) {
            Ok(sequence) => {
                log::debug!("sent {}{} to provider, sequence {}", amount, denom, sequence);
                emitted.push(sequence);
            }
            Err(source) => {
                rollback(ledger, transport, &emitted)?;
                return Err(ConsumerError::Transport { denom, source });
            }
        }
    }
    Ok(emitted.len())
}

fn rollback<L, T>(ledger: &mut L, transport: &mut T, emitted: &[u64]) -> ConsumerResult<()>
where
    L: LedgerAccessor,
    T: Transport + ?Sized,
{
    for &sequence in emitted.iter().rev() {
        transport
            .cancel_transfer(&mut *ledger, sequence)
            .map_err(|source| ConsumerError::Rollback { sequence, source })?;
        log::debug!("cancelled transfer {}", sequence);
    }
    Ok(())
}

fn no_recipient(address: &str, cause: CoreError) -> ConsumerError {
    ConsumerError::NoRecipient {
        address: address.to_string(),
        reason: cause.to_string(),
    }
}
