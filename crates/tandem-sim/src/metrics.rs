// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - METRICS MODULE
//
// Prometheus counters and gauges for the reward pipeline on both chains.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use tandem_consumer::{EndBlockReport, Transmission};
use tandem_core::Acknowledgement;
use tandem_provider::{BeginBlockReport, Receipt};

use crate::error::SimResult;

pub struct TandemMetrics {
    registry: Registry,

    // Consumer
    pub consumer_height: IntGauge,
    pub transmissions_attempted_total: IntCounter,
    pub transmissions_failed_total: IntCounter,
    pub transmissions_skipped_total: IntCounter,
    pub denoms_sent_total: IntCounter,

    // Transport
    pub packets_acknowledged_total: IntCounter,
    pub packets_rejected_total: IntCounter,
    pub packets_timed_out_total: IntCounter,
    pub unrelated_transfers_total: IntCounter,
    pub unattributed_rewards_total: IntCounter,

    // Provider
    pub provider_height: IntGauge,
    pub allocations_total: IntCounter,
    pub allocation_failures_total: IntCounter,
    pub validator_rewards_allocated_total: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> SimResult<IntCounter> {
    let c = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> SimResult<IntGauge> {
    let g = IntGauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

impl TandemMetrics {
    pub fn new() -> SimResult<Self> {
        let registry = Registry::new();
        Ok(Self {
            consumer_height: gauge(&registry, "tandem_consumer_height", "Consumer block height")?,
            transmissions_attempted_total: counter(
                &registry,
                "tandem_transmissions_attempted_total",
                "Scheduled reward transmissions that reached the sender",
            )?,
            transmissions_failed_total: counter(
                &registry,
                "tandem_transmissions_failed_total",
                "Transmissions rejected by the transport",
            )?,
            transmissions_skipped_total: counter(
                &registry,
                "tandem_transmissions_skipped_total",
                "Due transmissions skipped (no channel, nothing to send)",
            )?,
            denoms_sent_total: counter(
                &registry,
                "tandem_denoms_sent_total",
                "Reward denominations transferred to the provider",
            )?,
            packets_acknowledged_total: counter(
                &registry,
                "tandem_packets_acknowledged_total",
                "Transfer packets acknowledged with success",
            )?,
            packets_rejected_total: counter(
                &registry,
                "tandem_packets_rejected_total",
                "Transfer packets acknowledged with an error",
            )?,
            packets_timed_out_total: counter(
                &registry,
                "tandem_packets_timed_out_total",
                "Transfer packets that timed out before delivery",
            )?,
            unrelated_transfers_total: counter(
                &registry,
                "tandem_unrelated_transfers_total",
                "Delivered transfers not addressed to the consumer rewards pool",
            )?,
            unattributed_rewards_total: counter(
                &registry,
                "tandem_unattributed_rewards_total",
                "Reward transfers from a consumer that could not be identified",
            )?,
            provider_height: gauge(&registry, "tandem_provider_height", "Provider block height")?,
            allocations_total: counter(
                &registry,
                "tandem_allocations_total",
                "(consumer, denom) allocation rounds applied",
            )?,
            allocation_failures_total: counter(
                &registry,
                "tandem_allocation_failures_total",
                "(consumer, denom) allocation rounds that failed",
            )?,
            validator_rewards_allocated_total: counter(
                &registry,
                "tandem_validator_rewards_allocated_total",
                "Validator reward credits written to the distribution ledger",
            )?,
            registry,
        })
    }

    pub fn record_end_block(&self, height: i64, report: &EndBlockReport) {
        self.consumer_height.set(height);
        match &report.transmission {
            Transmission::NotDue => {}
            Transmission::Sent { denoms } => {
                self.transmissions_attempted_total.inc();
                self.denoms_sent_total.inc_by(*denoms as u64);
            }
            Transmission::Skipped { .. } => self.transmissions_skipped_total.inc(),
            Transmission::Failed { .. } => {
                self.transmissions_attempted_total.inc();
                self.transmissions_failed_total.inc();
            }
        }
    }

    pub fn record_begin_block(&self, height: i64, report: &BeginBlockReport) {
        self.provider_height.set(height);
        self.allocations_total.inc_by(report.allocations.len() as u64);
        self.allocation_failures_total.inc_by(report.failures as u64);
        let credits: usize = report.allocations.iter().map(|a| a.validators).sum();
        self.validator_rewards_allocated_total.inc_by(credits as u64);
    }

    pub fn record_receipt(&self, receipt: &Receipt) {
        match receipt {
            Receipt::Attributed { .. } => {}
            Receipt::Unrelated => self.unrelated_transfers_total.inc(),
            Receipt::UnknownConsumer => self.unattributed_rewards_total.inc(),
        }
    }

    pub fn record_ack(&self, ack: &Acknowledgement) {
        if ack.is_success() {
            self.packets_acknowledged_total.inc();
        } else {
            self.packets_rejected_total.inc();
        }
    }

    /// Export all metrics in Prometheus text format
    pub fn gather_text(&self) -> SimResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
