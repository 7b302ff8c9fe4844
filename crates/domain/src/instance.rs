use std::collections::HashSet;

/// Health state of a single compute instance as reported by a provider's
/// autoscaling API. Providers without a native concept of instance health
/// report every instance as `InService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceHealth {
    InService,
    Terminating,
    Unhealthy,
}

impl InstanceHealth {
    pub fn is_healthy(self) -> bool {
        matches!(self, InstanceHealth::InService)
    }
}

/// The flat, cross-provider record produced by a `CloudProvider` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Opaque id, always prefixed `i-`.
    pub instance_id: String,
    /// IPv4 dotted-quad.
    pub private_ip: String,
    /// Provider availability zone, e.g. `us-east-1a`. The last character
    /// is the zone letter used in hostname composition.
    pub zone: String,
    pub health: InstanceHealth,
    /// Tag/label binding this instance to an autoscaler alias, for
    /// providers that carry the binding on the instance itself rather
    /// than returning it from a dedicated memberships call.
    pub asg_label: Option<String>,
}

impl Instance {
    pub fn new(instance_id: impl Into<String>, private_ip: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            private_ip: private_ip.into(),
            zone: zone.into(),
            health: InstanceHealth::InService,
            asg_label: None,
        }
    }

    pub fn with_health(mut self, health: InstanceHealth) -> Self {
        self.health = health;
        self
    }

    pub fn with_asg_label(mut self, label: impl Into<String>) -> Self {
        self.asg_label = Some(label.into());
        self
    }

    /// The zone letter is the last character of the availability zone string.
    pub fn zone_letter(&self) -> Option<char> {
        self.zone.chars().last()
    }

    /// `instance_id` with the leading `i-` prefix stripped, for hostname
    /// composition.
    pub fn short_id(&self) -> &str {
        self.instance_id.strip_prefix("i-").unwrap_or(&self.instance_id)
    }
}

/// The filter union a `CloudProvider::list_instances` call is given.
/// Providers whose API cannot filter server-side are expected to list
/// everything and filter client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceFilter {
    All,
    ById(String),
    ByPrivateIp(String),
}

/// Healthy, in-service membership of autoscaler aliases, keyed by alias
/// name, as returned by `CloudProvider::list_autoscaling_memberships`.
pub type AsgMemberships = std::collections::HashMap<String, HashSet<String>>;
