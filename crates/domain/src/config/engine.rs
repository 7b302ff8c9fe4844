use serde::{Deserialize, Serialize};

pub const DEFAULT_INSTANCE_REGEX: &str =
    r"^(?P<region>[a-z]{2}\d)(?P<zone>[a-z])-(?P<account>\w+)-(?P<instanceId>\w*)$";

/// Resolution-engine configuration (spec §4.8).
///
/// `asg_timeout` and `throttle_window` are fixed by the spec, not
/// configurable — they're constants on `EngineConfig::new`, not fields
/// a config file can override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(rename = "refresh_interval", default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    #[serde(rename = "instance_timeout", default = "default_instance_timeout")]
    pub instance_timeout_secs: u64,

    #[serde(default)]
    pub zone_name: String,
    /// Effective region code used in hostname composition. Never read
    /// directly off the wire — the on-disk `region_code` key (spec §6)
    /// lives on `ProviderConfig`; `Config::apply_overrides` resolves this
    /// field from `ProviderConfig::effective_region_code()` after load.
    #[serde(skip)]
    pub region_code: String,
    #[serde(default)]
    pub account_name: String,

    #[serde(default = "default_asg_dns_tag")]
    pub asg_dns_tag: String,

    #[serde(default = "default_num_asg_records")]
    pub num_asg_records: usize,

    #[serde(default = "default_instance_regex")]
    pub instance_regex: String,
}

impl EngineConfig {
    pub const ASG_TIMEOUT_SECS: u64 = 600;
    pub const THROTTLE_WINDOW_SECS: u64 = 240;

    pub fn new(zone_name: String, region_code: String, account_name: String) -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            instance_timeout_secs: default_instance_timeout(),
            zone_name,
            region_code,
            account_name,
            asg_dns_tag: default_asg_dns_tag(),
            num_asg_records: default_num_asg_records(),
            instance_regex: default_instance_regex(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::new(String::new(), String::new(), String::new())
    }
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_instance_timeout() -> u64 {
    120
}

fn default_asg_dns_tag() -> String {
    "twitter:aws:dns-alias".to_string()
}

fn default_num_asg_records() -> usize {
    4
}

fn default_instance_regex() -> String {
    DEFAULT_INSTANCE_REGEX.to_string()
}
