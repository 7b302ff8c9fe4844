use std::sync::Arc;

use skyfleet_dns_application::ports::CloudProvider;
use skyfleet_dns_application::services::StatsRegistry;
use skyfleet_dns_domain::config::ProviderConfig;
use skyfleet_dns_domain::DomainError;
use skyfleet_dns_infrastructure::AwsCloudProvider;

/// Selects and constructs the concrete `CloudProvider` named by
/// `ProviderConfig::provider` (spec §6, `provider` key; §9 "providers are
/// distinct values, selected at construction"). Only the AWS-style REST
/// provider is wired up today; an unrecognized name is a fatal config
/// error rather than a silent fallback.
pub fn build_provider(config: &ProviderConfig, stats: &StatsRegistry) -> Result<Arc<dyn CloudProvider>, DomainError> {
    match config.provider.as_str() {
        "aws" => {
            let provider = AwsCloudProvider::new(config, stats)?;
            Ok(Arc::new(provider))
        }
        other => Err(DomainError::ConfigInvalid(format!("unknown provider {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_name_is_a_config_error() {
        let config = ProviderConfig {
            provider: "gce".to_string(),
            ..ProviderConfig::default()
        };
        let stats = StatsRegistry::new();
        assert!(matches!(build_provider(&config, &stats), Err(DomainError::ConfigInvalid(_))));
    }

    #[test]
    fn aws_provider_builds_successfully() {
        let config = ProviderConfig::default();
        let stats = StatsRegistry::new();
        assert!(build_provider(&config, &stats).is_ok());
    }
}
