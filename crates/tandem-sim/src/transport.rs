// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - LOOPBACK TRANSPORT
//
// In-process transfer channel between the two simulated chains. Sending
// escrows the coins on the consumer and queues the packet; a queued packet
// can still be cancelled within the block. The relayer drains the queue into
// the provider and refunds escrow on error acks and timeouts.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::VecDeque;

use tandem_consumer::{Transport, TransportError};
use tandem_core::{
    escrow_account, Coins, CoreResult, LedgerAccessor, RewardTransfer, TransferPacket,
    TRANSFER_PORT,
};

/// A packet that left the consumer and has not been acknowledged yet.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub packet: TransferPacket,
    pub sender_account: String,
    pub amount: Coins,
}

impl InFlight {
    /// Return the escrowed coins to the sender.
    pub fn refund(&self, ledger: &mut dyn LedgerAccessor) -> CoreResult<()> {
        let escrow = escrow_account(&self.packet.source_port, &self.packet.source_channel);
        ledger.transfer(&escrow, &self.sender_account, &self.amount)
    }
}

pub struct LoopbackTransport {
    source_channel: String,
    counterparty_channel: String,
    open: bool,
    fail_remaining: u32,
    next_sequence: u64,
    outbox: VecDeque<InFlight>,
}

impl LoopbackTransport {
    pub fn new(source_channel: &str, counterparty_channel: &str) -> Self {
        Self {
            source_channel: source_channel.to_string(),
            counterparty_channel: counterparty_channel.to_string(),
            open: true,
            fail_remaining: 0,
            next_sequence: 1,
            outbox: VecDeque::new(),
        }
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Reject the next `attempts` transfers.
    pub fn fail_next(&mut self, attempts: u32) {
        self.fail_remaining = attempts;
    }

    pub fn in_flight(&self) -> usize {
        self.outbox.len()
    }

    pub fn drain(&mut self) -> Vec<InFlight> {
        self.outbox.drain(..).collect()
    }
}

impl Transport for LoopbackTransport {
    fn channel_open(&self, port: &str, channel: &str) -> bool {
        self.open && port == TRANSFER_PORT && channel == self.source_channel
    }

    fn send_transfer(
        &mut self,
        ledger: &mut dyn LedgerAccessor,
        sender_account: &str,
        source_channel: &str,
        transfer: RewardTransfer,
        timeout_height: i64,
    ) -> Result<u64, TransportError> {
        if !self.channel_open(TRANSFER_PORT, source_channel) {
            return Err(TransportError::ChannelClosed {
                channel: source_channel.to_string(),
            });
        }
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            return Err(TransportError::NoCounterparty {
                channel: source_channel.to_string(),
            });
        }

        let mut amount = Coins::new();
        amount.add_amount(&transfer.denom, transfer.parsed_amount()?)?;
        let data = transfer.to_bytes()?;

        ledger.transfer(
            sender_account,
            &escrow_account(TRANSFER_PORT, source_channel),
            &amount,
        )?;

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.outbox.push_back(InFlight {
            packet: TransferPacket {
                sequence,
                source_port: TRANSFER_PORT.to_string(),
                source_channel: source_channel.to_string(),
                destination_port: TRANSFER_PORT.to_string(),
                destination_channel: self.counterparty_channel.clone(),
                data,
                timeout_height,
            },
            sender_account: sender_account.to_string(),
            amount,
        });
        Ok(sequence)
    }

    fn cancel_transfer(
        &mut self,
        ledger: &mut dyn LedgerAccessor,
        sequence: u64,
    ) -> Result<(), TransportError> {
        let pos = self
            .outbox
            .iter()
            .position(|f| f.packet.sequence == sequence)
            .ok_or_else(|| {
                TransportError::Rejected(format!("packet {} is no longer queued", sequence))
            })?;
        let flight = &self.outbox[pos];
        flight.refund(ledger)?;
        self.outbox.remove(pos);
        Ok(())
    }
}
