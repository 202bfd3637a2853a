//! Simulation config: the two chains' reward parameters plus the scenario
//! that drives them (fees per block, validator set, transport faults).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tandem_core::{
    consumer_rewards_pool_address, Coins, ConsumerParams, Decimal256, ProviderParams,
    TandemConfig,
};

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimValidator {
    pub name: String,
    #[serde(default = "default_voting_power")]
    pub voting_power: i64,
    #[serde(default)]
    pub join_height: i64,
    #[serde(default)]
    pub commission_rate: Decimal256,
}

fn default_voting_power() -> i64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Provider end of the transfer channel.
    pub provider_channel: String,
    /// Fees minted into the consumer fee collector every block, e.g. "1000stake".
    pub fees_per_block: String,
    pub validators: Vec<SimValidator>,
    /// Allow-list the provider-side form of every consumer reward denom at genesis.
    pub allow_consumer_denoms: bool,
    /// Number of transfer attempts the transport rejects before recovering.
    pub fail_transport_cycles: u32,
    /// Pay out validator commission from distribution after the run.
    pub withdraw_commission: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            provider_channel: "channel-0".to_string(),
            fees_per_block: "1000stake".to_string(),
            validators: (0..4)
                .map(|i| SimValidator {
                    name: format!("val-{}", i),
                    voting_power: default_voting_power(),
                    join_height: 0,
                    commission_rate: Decimal256::percent(5),
                })
                .collect(),
            allow_consumer_denoms: true,
            fail_transport_cycles: 0,
            withdraw_commission: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimConfig {
    #[serde(default)]
    pub consumer: ConsumerParams,
    #[serde(default)]
    pub provider: ProviderParams,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            consumer: ConsumerParams {
                blocks_per_distribution_transmission: 10,
                reward_denoms: ["stake".to_string()].into_iter().collect(),
                distribution_transmission_channel: "channel-1".to_string(),
                provider_fee_pool_address: consumer_rewards_pool_address().to_string(),
                transfer_timeout_blocks: 100,
                ..ConsumerParams::default()
            },
            provider: ProviderParams {
                number_of_epochs_to_start_receiving_rewards: 1,
                blocks_per_epoch: 10,
                ..ProviderParams::default()
            },
            scenario: ScenarioConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn load_from_file(path: &Path) -> SimResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SimError::Scenario(format!("read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| SimError::Scenario(format!("parse {}: {}", path.display(), e)))
    }

    pub fn save_to_file(&self, path: &Path) -> SimResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SimError::Scenario(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| SimError::Scenario(format!("write {}: {}", path.display(), e)))
    }

    /// Apply TANDEM_* overrides to the chain parameters.
    pub fn apply_env(&mut self) -> SimResult<()> {
        let mut params = TandemConfig {
            consumer: self.consumer.clone(),
            provider: self.provider.clone(),
        };
        params.apply_overrides(|key| std::env::var(key).ok())?;
        self.consumer = params.consumer;
        self.provider = params.provider;
        Ok(())
    }

    pub fn fees_per_block(&self) -> SimResult<Coins> {
        Ok(Coins::from_str(&self.scenario.fees_per_block)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.consumer.validate()?;
        self.provider.validate()?;
        self.fees_per_block()?;
        if self.scenario.provider_channel.is_empty() {
            return Err(SimError::Scenario("provider_channel is empty".into()));
        }
        for v in &self.scenario.validators {
            if v.name.is_empty() || v.commission_rate > Decimal256::one() {
                return Err(SimError::Scenario(format!("invalid validator {:?}", v.name)));
            }
        }
        Ok(())
    }
}
