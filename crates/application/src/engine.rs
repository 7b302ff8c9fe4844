use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use skyfleet_dns_domain::config::EngineConfig;
use skyfleet_dns_domain::{Instance, InstanceFilter};

use crate::ports::CloudProvider;
use crate::services::{Cache, HostMatch, HostMatcher, ReverseZoneHelper, StatsRegistry, Throttler};

/// Forward/reverse/ASG resolution over the host and ASG caches, with a
/// throttled miss-fill path back to the provider (spec C8). Owns every
/// cache; nothing outside the engine mutates them.
pub struct ResolutionEngine {
    config: EngineConfig,
    provider: Arc<dyn CloudProvider>,
    host_cache: Cache<String>,
    asg_cache: Cache<Vec<String>>,
    throttler: Throttler,
    matcher: HostMatcher,
    reverse_zone: ReverseZoneHelper,
    stats: Arc<StatsRegistry>,
    /// Canonical shutdown signal (spec §5): cancelled during teardown so
    /// an in-flight miss-fill observes it and skips its cache insert.
    /// `RefresherJob` drives its own loop/sleep off this same token via
    /// `shutdown_token()`, so one cancellation stops both.
    shutdown: CancellationToken,
}

impl ResolutionEngine {
    pub fn new(
        config: EngineConfig,
        vpc_cidr: &str,
        provider: Arc<dyn CloudProvider>,
        stats: Arc<StatsRegistry>,
    ) -> Result<Self, skyfleet_dns_domain::DomainError> {
        let matcher = HostMatcher::new(&config.instance_regex)?;
        let reverse_zone = ReverseZoneHelper::init_from_cidr(vpc_cidr)?;
        let instance_timeout = Duration::from_secs(config.instance_timeout_secs);

        Ok(Self {
            config,
            provider,
            host_cache: Cache::new(instance_timeout),
            asg_cache: Cache::new(Duration::from_secs(EngineConfig::ASG_TIMEOUT_SECS)),
            throttler: Throttler::new(),
            matcher,
            reverse_zone,
            stats,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clone of the engine's shutdown signal, for collaborators (the
    /// background refresher) that need to observe the same teardown event.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Requests teardown: in-flight miss-fills stop inserting into the
    /// host cache and the refresher's loop/sleep unblock promptly.
    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn instance_timeout(&self) -> Duration {
        Duration::from_secs(self.config.instance_timeout_secs)
    }

    /// `<regionCode><last char of zone>-<accountName>-<shortId>.<zoneName>`,
    /// always ending in a single trailing dot.
    pub fn compose_hostname(&self, instance: &Instance) -> String {
        let zone_letter = instance.zone_letter().unwrap_or_default();
        let zone_name = self.config.zone_name.trim_end_matches('.');
        format!(
            "{}{}-{}-{}.{}.",
            self.config.region_code,
            zone_letter,
            self.config.account_name,
            instance.short_id(),
            zone_name
        )
    }

    pub fn is_forward_zone(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(self.config.zone_name.trim_end_matches('.'))
    }

    pub fn is_autoscaler_zone(&self, name: &str) -> bool {
        let expected = format!("asg.{}", self.config.zone_name.trim_end_matches('.'));
        name.eq_ignore_ascii_case(&expected)
    }

    pub fn is_reverse_zone(&self, name: &str) -> bool {
        self.reverse_zone.is_reverse_zone(name)
    }

    #[instrument(skip(self, client_addr))]
    pub async fn resolve_ip(&self, instance_id: &str, client_addr: &str) -> (Option<String>, bool) {
        self.stats.create("a_requests").increment(1);

        if instance_id.is_empty() {
            return (None, false);
        }
        if let Some(ip) = self.host_cache.try_get(instance_id) {
            return (Some(ip), true);
        }
        if self.throttler.is_throttled(client_addr, instance_id) {
            return (None, false);
        }
        self.throttler.on_miss(instance_id, client_addr);

        let instances = match self
            .provider
            .list_instances(InstanceFilter::ById(instance_id.to_string()))
            .await
        {
            Ok(instances) => instances,
            Err(e) => {
                warn!(error = %e, %instance_id, "provider lookup failed during miss-fill");
                return (None, false);
            }
        };

        match instances.into_iter().next() {
            Some(instance) => {
                if !self.shutdown.is_cancelled() {
                    let deadline = Instant::now() + self.instance_timeout();
                    self.host_cache
                        .insert_with_deadline(instance_id.to_string(), instance.private_ip.clone(), deadline);
                }
                (Some(instance.private_ip), true)
            }
            None => (None, false),
        }
    }

    #[instrument(skip(self, client_addr))]
    pub async fn resolve_hostname(&self, ip: &str, client_addr: &str) -> (Option<String>, bool) {
        self.stats.create("ptr_requests").increment(1);

        if ip.is_empty() {
            return (None, false);
        }
        if let Some(hostname) = self.host_cache.try_get(ip) {
            return (Some(hostname), true);
        }
        if self.throttler.is_throttled(client_addr, ip) {
            return (None, false);
        }
        self.throttler.on_miss(ip, client_addr);

        let instances = match self
            .provider
            .list_instances(InstanceFilter::ByPrivateIp(ip.to_string()))
            .await
        {
            Ok(instances) => instances,
            Err(e) => {
                warn!(error = %e, %ip, "provider lookup failed during miss-fill");
                return (None, false);
            }
        };

        match instances.into_iter().next() {
            Some(instance) => {
                let hostname = self.compose_hostname(&instance);
                if !self.shutdown.is_cancelled() {
                    let deadline = Instant::now() + self.instance_timeout();
                    self.host_cache.insert_with_deadline(ip.to_string(), hostname.clone(), deadline);
                }
                (Some(hostname), true)
            }
            None => (None, false),
        }
    }

    /// Pure cache read; never calls the provider from the query path.
    /// Up to `numAsgRecords` members are shuffled via the k-random
    /// sampler at read time, so repeated queries see different subsets
    /// of a large membership.
    #[instrument(skip(self, client_addr))]
    pub async fn resolve_autoscaler(&self, alias: &str, client_addr: &str) -> (Vec<String>, bool) {
        let _ = client_addr;
        self.stats.create("autoscaler_requests").increment(1);

        if alias.is_empty() {
            return (Vec::new(), false);
        }
        match self.asg_cache.try_get(alias) {
            Some(members) => {
                let sample = crate::services::k_random::iterate(&members, self.config.num_asg_records);
                (sample, true)
            }
            None => (Vec::new(), false),
        }
    }

    /// Parses a forward query name into `(instanceId, region)` via C4, for
    /// callers that need to turn a raw DNS label into the key `resolve_ip`
    /// expects.
    pub fn try_match_hostname(&self, host: &str) -> Option<HostMatch> {
        self.matcher.try_match(host)
    }

    /// Drives one full cycle of the background refresher: pull inventory,
    /// rebuild the ASG cache, bulk-repopulate the host cache, trim the
    /// throttler, then run the provider's after-refresh hook.
    ///
    /// Returns `false` if the inventory pull failed; every other step is
    /// skipped for this tick (retried on the next one).
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> bool {
        let instances = match self.provider.list_instances(InstanceFilter::All).await {
            Ok(instances) => instances,
            Err(e) => {
                warn!(error = %e, "inventory pull failed, skipping this refresh tick");
                return false;
            }
        };

        let ip_map = Self::build_ip_map(&instances);
        let healthy_ids: std::collections::HashSet<&str> = instances
            .iter()
            .filter(|i| i.health.is_healthy())
            .map(|i| i.instance_id.as_str())
            .collect();

        match self.provider.list_autoscaling_memberships().await {
            Ok(memberships) => {
                let asg_deadline = Instant::now() + Duration::from_secs(EngineConfig::ASG_TIMEOUT_SECS);
                for (alias, member_ids) in memberships {
                    let ips: Vec<String> = member_ids
                        .into_iter()
                        .filter(|id| healthy_ids.contains(id.as_str()))
                        .filter_map(|id| ip_map.get(&id).cloned())
                        .collect();
                    self.asg_cache.insert_with_deadline(alias, ips, asg_deadline);
                }
                self.asg_cache.trim();
            }
            Err(e) => {
                warn!(error = %e, "failed to list autoscaling memberships, leaving ASG cache untouched");
            }
        }

        let host_deadline = Instant::now() + self.instance_timeout();
        self.host_cache.bulk(|b| {
            b.trim();
            for instance in &instances {
                let hostname = self.compose_hostname(instance);
                b.insert_with_deadline(instance.instance_id.clone(), instance.private_ip.clone(), host_deadline);
                b.insert_with_deadline(instance.private_ip.clone(), hostname, host_deadline);
            }
        });
        debug!(count = instances.len(), "host cache repopulated");

        self.throttler.trim();
        self.provider.after_refresh().await;

        true
    }

    /// `name + "." + zone`, stripped and byte-reversed into a dotted IPv4,
    /// then delegated to `resolve_hostname`.
    pub async fn reverse_lookup(&self, zone: &str, name: &str, client_addr: &str) -> (Option<String>, bool) {
        match ReverseZoneHelper::reverse_lookup_ip(name, zone) {
            Some(ip) => self.resolve_hostname(&ip, client_addr).await,
            None => (None, false),
        }
    }

    pub fn stats(&self) -> &Arc<StatsRegistry> {
        &self.stats
    }

    /// Instance-id → private-ip projection used by the background
    /// refresher to resolve ASG memberships into addresses.
    pub(crate) fn build_ip_map(instances: &[Instance]) -> HashMap<String, String> {
        instances
            .iter()
            .map(|i| (i.instance_id.clone(), i.private_ip.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skyfleet_dns_domain::{AsgMemberships, DomainError, InstanceHealth};
    use std::sync::Mutex;

    struct MockProvider {
        by_id: HashMap<String, Instance>,
        by_ip: HashMap<String, Instance>,
        memberships: AsgMemberships,
        call_count: Arc<Mutex<u32>>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                by_id: HashMap::new(),
                by_ip: HashMap::new(),
                memberships: HashMap::new(),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        fn with_instance(mut self, instance: Instance) -> Self {
            self.by_id.insert(instance.instance_id.clone(), instance.clone());
            self.by_ip.insert(instance.private_ip.clone(), instance);
            self
        }

        fn with_membership(mut self, alias: &str, member_ids: &[&str]) -> Self {
            self.memberships.insert(
                alias.to_string(),
                member_ids.iter().map(|s| s.to_string()).collect(),
            );
            self
        }

        fn shared_call_count(&self) -> Arc<Mutex<u32>> {
            Arc::clone(&self.call_count)
        }
    }

    #[async_trait]
    impl CloudProvider for MockProvider {
        async fn list_instances(&self, filter: InstanceFilter) -> Result<Vec<Instance>, DomainError> {
            *self.call_count.lock().unwrap() += 1;
            let result = match filter {
                InstanceFilter::All => self.by_id.values().cloned().collect(),
                InstanceFilter::ById(id) => self.by_id.get(&id).cloned().into_iter().collect(),
                InstanceFilter::ByPrivateIp(ip) => self.by_ip.get(&ip).cloned().into_iter().collect(),
            };
            Ok(result)
        }

        async fn list_autoscaling_memberships(&self) -> Result<AsgMemberships, DomainError> {
            Ok(self.memberships.clone())
        }
    }

    fn test_engine(provider: MockProvider) -> ResolutionEngine {
        let config = EngineConfig::new("aws.test.".into(), "ue1".into(), "tc".into());
        ResolutionEngine::new(config, "10.0.0.0/16", Arc::new(provider), Arc::new(StatsRegistry::new())).unwrap()
    }

    #[tokio::test]
    async fn resolves_forward_then_caches() {
        let instance = Instance::new("i-1234567", "10.1.2.3", "us-east-1a");
        let provider = MockProvider::new().with_instance(instance);
        let call_count = provider.shared_call_count();
        let engine = test_engine(provider);

        let (ip, ok) = engine.resolve_ip("i-1234567", "127.0.0.1").await;
        assert!(ok);
        assert_eq!(ip.as_deref(), Some("10.1.2.3"));

        let (ip2, ok2) = engine.resolve_ip("i-1234567", "127.0.0.1").await;
        assert!(ok2);
        assert_eq!(ip2.as_deref(), Some("10.1.2.3"));

        assert_eq!(*call_count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn composes_fqdn_on_reverse_resolve() {
        let instance = Instance::new("i-1234567", "10.1.2.3", "us-east-1a");
        let engine = test_engine(MockProvider::new().with_instance(instance));

        let (hostname, ok) = engine.resolve_hostname("10.1.2.3", "127.0.0.1").await;
        assert!(ok);
        assert_eq!(hostname.as_deref(), Some("ue1a-tc-1234567.aws.test."));
    }

    #[tokio::test]
    async fn second_client_is_throttled_after_miss() {
        let engine = test_engine(MockProvider::new());
        let (_, ok1) = engine.resolve_ip("i-missing", "1.1.1.1").await;
        assert!(!ok1);
        let (_, ok2) = engine.resolve_ip("i-missing", "9.9.9.9").await;
        assert!(!ok2);
    }

    #[tokio::test]
    async fn self_query_never_throttled() {
        let engine = test_engine(MockProvider::new());
        let (_, ok1) = engine.resolve_ip("10.0.0.5", "10.0.0.5").await;
        assert!(!ok1);
        let (_, ok2) = engine.resolve_ip("10.0.0.5", "10.0.0.5").await;
        assert!(!ok2);
    }

    #[tokio::test]
    async fn autoscaler_resolve_is_pure_cache_read() {
        let engine = test_engine(MockProvider::new());
        engine
            .asg_cache
            .insert("testasg", vec!["1.2.3.4".to_string()]);
        let (ips, ok) = engine.resolve_autoscaler("testasg", "127.0.0.1").await;
        assert!(ok);
        assert_eq!(ips, vec!["1.2.3.4".to_string()]);

        let (_, ok_unknown) = engine.resolve_autoscaler("unknown", "127.0.0.1").await;
        assert!(!ok_unknown);
    }

    #[tokio::test]
    async fn refresh_builds_asg_cache_from_healthy_members_only() {
        let provider = MockProvider::new()
            .with_instance(Instance::new("i-1", "1.2.3.4", "us-east-1a"))
            .with_instance(Instance::new("i-2", "1.2.3.5", "us-east-1a").with_health(InstanceHealth::Terminating))
            .with_instance(Instance::new("i-3", "1.2.3.6", "us-east-1a").with_health(InstanceHealth::Unhealthy))
            .with_membership("testasg", &["i-1", "i-2", "i-3"]);
        let engine = test_engine(provider);

        assert!(engine.refresh().await);

        let (ips, ok) = engine.resolve_autoscaler("testasg", "127.0.0.1").await;
        assert!(ok);
        assert_eq!(ips, vec!["1.2.3.4".to_string()]);

        let (_, ok_unknown) = engine.resolve_autoscaler("unknown-alias", "127.0.0.1").await;
        assert!(!ok_unknown);
    }

    #[tokio::test]
    async fn refresh_populates_host_cache_both_directions() {
        let instance = Instance::new("i-1234567", "10.1.2.3", "us-east-1a");
        let engine = test_engine(MockProvider::new().with_instance(instance));

        assert!(engine.refresh().await);

        let (ip, ok) = engine.resolve_ip("i-1234567", "127.0.0.1").await;
        assert!(ok);
        assert_eq!(ip.as_deref(), Some("10.1.2.3"));

        let (hostname, ok) = engine.resolve_hostname("10.1.2.3", "127.0.0.1").await;
        assert!(ok);
        assert_eq!(hostname.as_deref(), Some("ue1a-tc-1234567.aws.test."));
    }

    #[tokio::test]
    async fn failed_pull_skips_tick_without_panicking() {
        struct FailingProvider;

        #[async_trait]
        impl CloudProvider for FailingProvider {
            async fn list_instances(&self, _filter: InstanceFilter) -> Result<Vec<Instance>, DomainError> {
                Err(DomainError::ProviderUnavailable("network error".into()))
            }

            async fn list_autoscaling_memberships(&self) -> Result<AsgMemberships, DomainError> {
                Ok(HashMap::new())
            }
        }

        let config = EngineConfig::new("aws.test.".into(), "ue1".into(), "tc".into());
        let engine =
            ResolutionEngine::new(config, "10.0.0.0/16", Arc::new(FailingProvider), Arc::new(StatsRegistry::new()))
                .unwrap();
        assert!(!engine.refresh().await);
    }

    #[test]
    fn zone_classification_is_case_insensitive() {
        let engine = test_engine(MockProvider::new());
        assert!(engine.is_forward_zone("AWS.TEST"));
        assert!(engine.is_autoscaler_zone("asg.aws.test"));
        assert!(!engine.is_forward_zone("other.zone"));
    }

    #[tokio::test]
    async fn miss_fill_does_not_insert_into_cache_after_shutdown() {
        let instance = Instance::new("i-1234567", "10.1.2.3", "us-east-1a");
        let engine = test_engine(MockProvider::new().with_instance(instance));
        engine.request_shutdown();

        let (ip, ok) = engine.resolve_ip("i-1234567", "127.0.0.1").await;
        assert!(ok);
        assert_eq!(ip.as_deref(), Some("10.1.2.3"));
        assert!(engine.host_cache.try_get("i-1234567").is_none());
    }
}
