use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::engine::EngineConfig;
use crate::config::logging::LoggingConfig;
use crate::config::provider::ProviderConfig;
use crate::errors::DomainError;
use crate::validators;

/// Full on-disk configuration (spec §6: JSON file, overridable by the
/// three positional CLI arguments).
///
/// Spec §6's config table lists every recognized key — `provider`,
/// `region`, `region_code`, `instance_regex`, `account_name`,
/// `refresh_interval`, `instance_timeout`, `request_batch_size`,
/// `asg_dns_tag`, `log_level`, … — flat in a single on-disk JSON object,
/// not nested under `engine`/`provider`/`logging` sub-objects. `engine`,
/// `provider`, and `logging` stay separate Rust types for the same
/// per-concern-module convention the rest of `domain::config` uses, but
/// each is `#[serde(flatten)]`ed here so the wire shape matches the spec
/// exactly; the grouping is an internal implementation detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub engine: EngineConfig,
    #[serde(flatten)]
    pub provider: ProviderConfig,
    #[serde(flatten)]
    pub logging: LoggingConfig,

    /// VPC CIDR the reverse-zone helper enumerates. Not part of
    /// `EngineConfig` since it drives `.in-addr.arpa` zone setup rather
    /// than the resolution engine itself.
    pub vpc_cidr: String,
}

/// Positional CLI arguments (spec §6: `zoneName vpcCidr accountName`),
/// applied on top of whatever the config file already holds.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub zone_name: Option<String>,
    pub vpc_cidr: Option<String>,
    pub account_name: Option<String>,
}

impl Config {
    /// Loads the config file, applies CLI overrides, then validates.
    pub fn load(path: impl AsRef<Path>, overrides: CliOverrides) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&raw)?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(zone_name) = overrides.zone_name {
            self.engine.zone_name = zone_name;
        }
        if let Some(vpc_cidr) = overrides.vpc_cidr {
            self.vpc_cidr = vpc_cidr;
        }
        if let Some(account_name) = overrides.account_name {
            self.engine.account_name = account_name;
        }

        if self.engine.region_code.is_empty() {
            if let Some(code) = self.provider.effective_region_code() {
                self.engine.region_code = code.to_string();
            }
        }
    }

    /// Fatal on any required field being blank or malformed — the host
    /// process is expected to exit rather than run with a half-built
    /// engine (spec §6's "fatal ... on missing required arguments").
    pub fn validate(&self) -> Result<(), DomainError> {
        validators::validate_non_empty("zoneName", &self.engine.zone_name)?;
        validators::validate_non_empty("accountName", &self.engine.account_name)?;
        validators::validate_non_empty("regionCode", &self.engine.region_code)?;
        validators::validate_vpc_cidr(&self.vpc_cidr)?;
        Ok(())
    }
}
