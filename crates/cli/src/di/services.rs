use std::sync::Arc;

use skyfleet_dns_application::services::StatsRegistry;
use skyfleet_dns_application::ResolutionEngine;
use skyfleet_dns_domain::config::Config;
use skyfleet_dns_domain::DomainError;

use super::provider::build_provider;

/// Everything the host-shim harness needs once config is loaded: the
/// stats registry and the wired-up resolution engine. Mirrors the
/// teacher's `di` module shape — one struct assembling the collaborators
/// a concrete command needs, built once at startup.
pub struct Services {
    pub stats: Arc<StatsRegistry>,
    pub engine: Arc<ResolutionEngine>,
}

impl Services {
    pub fn build(config: &Config) -> Result<Self, DomainError> {
        let stats = Arc::new(StatsRegistry::new());
        let provider = build_provider(&config.provider, &stats)?;
        let engine = Arc::new(ResolutionEngine::new(
            config.engine.clone(),
            &config.vpc_cidr,
            provider,
            Arc::clone(&stats),
        )?);
        Ok(Self { stats, engine })
    }
}
