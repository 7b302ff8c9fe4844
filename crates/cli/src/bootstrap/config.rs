use skyfleet_dns_domain::config::{CliOverrides, Config};
use tracing::info;

/// Loads the JSON config file and layers the positional host args
/// (`zoneName vpcCidr accountName`, spec §6) over it. A missing required
/// field after overrides is a fatal `ConfigInvalid` — the process exits
/// rather than run with a half-built engine.
pub fn load_config(config_path: &str, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(config_path, overrides)?;

    info!(
        config_file = config_path,
        zone_name = %config.engine.zone_name,
        region_code = %config.engine.region_code,
        account_name = %config.engine.account_name,
        vpc_cidr = %config.vpc_cidr,
        provider = %config.provider.provider,
        "configuration loaded"
    );

    Ok(config)
}
