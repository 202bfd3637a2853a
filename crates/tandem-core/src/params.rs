// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM (XCR) - PARAMETERS
//
// Consumer and provider reward parameters. Loaded from TOML, overridable from
// TANDEM_* environment variables, validated once and then handed to every
// operation as an immutable snapshot.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use cosmwasm_std::Decimal256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::denom::{ibc_denom, validate_denom};
use crate::error::{CoreError, CoreResult};
use crate::TRANSFER_PORT;

pub const DEFAULT_BLOCKS_PER_DISTRIBUTION_TRANSMISSION: i64 = 1000;
/// Share of consumer fees kept on the consumer chain, in percent.
pub const DEFAULT_CONSUMER_REDISTRIBUTION_PERCENT: u64 = 75;
pub const DEFAULT_TRANSFER_TIMEOUT_BLOCKS: i64 = 3600;
pub const DEFAULT_BLOCKS_PER_EPOCH: i64 = 600;
pub const DEFAULT_EPOCHS_TO_START_RECEIVING_REWARDS: i64 = 24;
/// Community tax, in permille.
pub const DEFAULT_COMMUNITY_TAX_PERMILLE: u64 = 20;

// ─────────────────────────────────────────────────────────────────
// Consumer
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsumerParams {
    /// Consumer id assigned by the provider at launch; sent in the reward memo.
    pub consumer_id: String,
    pub chain_id: String,
    pub blocks_per_distribution_transmission: i64,
    pub consumer_redistribution_fraction: Decimal256,
    /// Locally collected denoms eligible for transmission.
    pub reward_denoms: BTreeSet<String>,
    /// Provider-native denoms as named on the provider; they reach the
    /// consumer through the transmission channel as ibc vouchers.
    pub provider_reward_denoms: BTreeSet<String>,
    /// Empty disables sending.
    pub distribution_transmission_channel: String,
    pub provider_fee_pool_address: String,
    pub transfer_timeout_blocks: i64,
}

impl Default for ConsumerParams {
    fn default() -> Self {
        Self {
            consumer_id: "0".to_string(),
            chain_id: "consumer-1".to_string(),
            blocks_per_distribution_transmission: DEFAULT_BLOCKS_PER_DISTRIBUTION_TRANSMISSION,
            consumer_redistribution_fraction: Decimal256::percent(DEFAULT_CONSUMER_REDISTRIBUTION_PERCENT),
            reward_denoms: BTreeSet::new(),
            provider_reward_denoms: BTreeSet::new(),
            distribution_transmission_channel: String::new(),
            provider_fee_pool_address: String::new(),
            transfer_timeout_blocks: DEFAULT_TRANSFER_TIMEOUT_BLOCKS,
        }
    }
}

impl ConsumerParams {
    /// Denoms the sender may move: the configured reward denoms plus the
    /// voucher form of every provider reward denom on the transmission channel.
    pub fn allowed_reward_denoms(&self) -> BTreeSet<String> {
        let mut allowed = self.reward_denoms.clone();
        if !self.distribution_transmission_channel.is_empty() {
            for denom in &self.provider_reward_denoms {
                allowed.insert(ibc_denom(
                    TRANSFER_PORT,
                    &self.distribution_transmission_channel,
                    denom,
                ));
            }
        }
        allowed
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.consumer_id.is_empty() {
            return Err(CoreError::InvalidParams("consumer_id cannot be empty".into()));
        }
        if self.blocks_per_distribution_transmission <= 0 {
            return Err(CoreError::InvalidParams(format!(
                "blocks_per_distribution_transmission must be positive, got {}",
                self.blocks_per_distribution_transmission
            )));
        }
        if self.consumer_redistribution_fraction > Decimal256::one() {
            return Err(CoreError::InvalidFraction {
                value: self.consumer_redistribution_fraction.to_string(),
            });
        }
        if self.transfer_timeout_blocks < 0 {
            return Err(CoreError::InvalidParams(
                "transfer_timeout_blocks cannot be negative".into(),
            ));
        }
        for denom in self.reward_denoms.iter().chain(&self.provider_reward_denoms) {
            validate_denom(denom)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderParams {
    /// Initial allow-list. Later changes go through the admin actions.
    pub consumer_reward_denoms: BTreeSet<String>,
    pub number_of_epochs_to_start_receiving_rewards: i64,
    pub blocks_per_epoch: i64,
    pub community_tax: Decimal256,
}

impl Default for ProviderParams {
    fn default() -> Self {
        Self {
            consumer_reward_denoms: BTreeSet::new(),
            number_of_epochs_to_start_receiving_rewards: DEFAULT_EPOCHS_TO_START_RECEIVING_REWARDS,
            blocks_per_epoch: DEFAULT_BLOCKS_PER_EPOCH,
            community_tax: Decimal256::permille(DEFAULT_COMMUNITY_TAX_PERMILLE),
        }
    }
}

impl ProviderParams {
    /// Minimum tenure, in blocks, before a consumer validator is rewarded.
    pub fn eligibility_blocks(&self) -> i64 {
        self.number_of_epochs_to_start_receiving_rewards
            .saturating_mul(self.blocks_per_epoch)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.blocks_per_epoch <= 0 {
            return Err(CoreError::InvalidParams(format!(
                "blocks_per_epoch must be positive, got {}",
                self.blocks_per_epoch
            )));
        }
        if self.number_of_epochs_to_start_receiving_rewards < 0 {
            return Err(CoreError::InvalidParams(
                "number_of_epochs_to_start_receiving_rewards cannot be negative".into(),
            ));
        }
        if self.community_tax > Decimal256::one() {
            return Err(CoreError::InvalidFraction {
                value: self.community_tax.to_string(),
            });
        }
        for denom in &self.consumer_reward_denoms {
            validate_denom(denom)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Config file
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TandemConfig {
    pub consumer: ConsumerParams,
    pub provider: ProviderParams,
}

impl TandemConfig {
    /// Load config from TOML file
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: TandemConfig = toml::from_str(&content)?;
        log::info!("loaded reward parameters from {}", path.display());
        Ok(config)
    }

    /// Defaults with TANDEM_* environment overrides applied
    pub fn load_from_env() -> CoreResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> CoreResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.consumer.validate()?;
        self.provider.validate()
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Denom lists are comma separated.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            let value = lookup(key);
            if let Some(v) = &value {
                log::debug!("{} overridden: {}", key, v);
            }
            value
        };

        let c = &mut self.consumer;
        if let Some(v) = lookup("TANDEM_CONSUMER_ID") {
            c.consumer_id = v;
        }
        if let Some(v) = lookup("TANDEM_CHAIN_ID") {
            c.chain_id = v;
        }
        if let Some(v) = lookup("TANDEM_BLOCKS_PER_DISTRIBUTION_TRANSMISSION") {
            c.blocks_per_distribution_transmission = parse_int(&v)?;
        }
        if let Some(v) = lookup("TANDEM_CONSUMER_REDISTRIBUTION_FRACTION") {
            c.consumer_redistribution_fraction = parse_dec(&v)?;
        }
        if let Some(v) = lookup("TANDEM_REWARD_DENOMS") {
            c.reward_denoms = parse_set(&v);
        }
        if let Some(v) = lookup("TANDEM_PROVIDER_REWARD_DENOMS") {
            c.provider_reward_denoms = parse_set(&v);
        }
        if let Some(v) = lookup("TANDEM_DISTRIBUTION_TRANSMISSION_CHANNEL") {
            c.distribution_transmission_channel = v;
        }
        if let Some(v) = lookup("TANDEM_PROVIDER_FEE_POOL_ADDRESS") {
            c.provider_fee_pool_address = v;
        }
        if let Some(v) = lookup("TANDEM_TRANSFER_TIMEOUT_BLOCKS") {
            c.transfer_timeout_blocks = parse_int(&v)?;
        }

        let p = &mut self.provider;
        if let Some(v) = lookup("TANDEM_CONSUMER_REWARD_DENOMS") {
            p.consumer_reward_denoms = parse_set(&v);
        }
        if let Some(v) = lookup("TANDEM_EPOCHS_TO_START_RECEIVING_REWARDS") {
            p.number_of_epochs_to_start_receiving_rewards = parse_int(&v)?;
        }
        if let Some(v) = lookup("TANDEM_BLOCKS_PER_EPOCH") {
            p.blocks_per_epoch = parse_int(&v)?;
        }
        if let Some(v) = lookup("TANDEM_COMMUNITY_TAX") {
            p.community_tax = parse_dec(&v)?;
        }
        Ok(())
    }
}

fn parse_int(raw: &str) -> CoreResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::InvalidParams(format!("'{}' is not an integer", raw)))
}

fn parse_dec(raw: &str) -> CoreResult<Decimal256> {
    Decimal256::from_str(raw.trim())
        .map_err(|_| CoreError::InvalidParams(format!("'{}' is not a decimal", raw)))
}

fn parse_set(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = TandemConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.eligibility_blocks(), 24 * 600);
        assert_eq!(
            config.consumer.consumer_redistribution_fraction,
            Decimal256::from_str("0.75").unwrap()
        );
        assert_eq!(
            config.provider.community_tax,
            Decimal256::from_str("0.02").unwrap()
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = TandemConfig::default();
        config.consumer.blocks_per_distribution_transmission = 0;
        assert!(config.validate().is_err());

        let mut config = TandemConfig::default();
        config.provider.community_tax = Decimal256::percent(101);
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidFraction { .. })
        ));

        let mut config = TandemConfig::default();
        config.consumer.reward_denoms.insert("x".into());
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidDenom { .. })
        ));
    }

    #[test]
    fn test_allowed_reward_denoms_include_provider_vouchers() {
        let mut params = ConsumerParams::default();
        params.reward_denoms.insert("stake".into());
        params.provider_reward_denoms.insert("uprov".into());
        // no channel yet, vouchers cannot be named
        assert_eq!(params.allowed_reward_denoms().len(), 1);

        params.distribution_transmission_channel = "channel-1".into();
        let allowed = params.allowed_reward_denoms();
        assert!(allowed.contains("stake"));
        assert!(allowed.contains(&ibc_denom("transfer", "channel-1", "uprov")));
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tandem.toml");

        let mut config = TandemConfig::default();
        config.consumer.reward_denoms.insert("stake".into());
        config.consumer.distribution_transmission_channel = "channel-0".into();
        config.provider.community_tax = Decimal256::percent(10);

        config.save_to_file(&path).unwrap();
        let loaded = TandemConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tandem.toml");
        fs::write(&path, "[provider]\nblocks_per_epoch = 10\n").unwrap();

        let loaded = TandemConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.provider.blocks_per_epoch, 10);
        assert_eq!(loaded.consumer, ConsumerParams::default());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TANDEM_BLOCKS_PER_DISTRIBUTION_TRANSMISSION", "5"),
            ("TANDEM_COMMUNITY_TAX", "0.1"),
            ("TANDEM_REWARD_DENOMS", "stake, uatom"),
        ]
        .into_iter()
        .collect();

        let mut config = TandemConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.consumer.blocks_per_distribution_transmission, 5);
        assert_eq!(config.provider.community_tax, Decimal256::percent(10));
        assert_eq!(config.consumer.reward_denoms.len(), 2);

        let bad = |k: &str| (k == "TANDEM_BLOCKS_PER_EPOCH").then(|| "ten".to_string());
        assert!(TandemConfig::default().apply_overrides(bad).is_err());
    }
}
