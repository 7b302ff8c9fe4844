use async_trait::async_trait;
use skyfleet_dns_domain::{AsgMemberships, DomainError, Instance, InstanceFilter};

/// The boundary between the resolution engine and whatever cloud API
/// actually answers "what instances exist" and "what's healthy in this
/// autoscaler alias". A concrete provider lives in the infrastructure
/// crate; the engine only ever sees this trait.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Lists instances matching `filter`. `InstanceFilter::All` drives the
    /// periodic refresh; the `ById`/`ByPrivateIp` variants drive a single
    /// miss-fill lookup on the query path. Providers that can't filter
    /// server-side list everything and filter client-side.
    async fn list_instances(&self, filter: InstanceFilter) -> Result<Vec<Instance>, DomainError>;

    /// Healthy, in-service membership per autoscaler alias, keyed by the
    /// alias name carried in `EngineConfig::asg_dns_tag`.
    async fn list_autoscaling_memberships(&self) -> Result<AsgMemberships, DomainError>;

    /// Called once at the end of every refresh cycle, after the ASG and
    /// host caches are repopulated. Providers with their own internal
    /// caches (e.g. a zone-name cache) hook cleanup here; the default is
    /// a no-op.
    async fn after_refresh(&self) {}
}
