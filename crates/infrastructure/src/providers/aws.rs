use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use skyfleet_dns_application::ports::CloudProvider;
use skyfleet_dns_application::services::{Counter, StatsRegistry};
use skyfleet_dns_domain::config::ProviderConfig;
use skyfleet_dns_domain::{AsgMemberships, DomainError, Instance, InstanceFilter, InstanceHealth};

const MAX_PAGER_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct InstancesPage {
    instances: Vec<RawInstance>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    instance_id: String,
    private_ip: String,
    availability_zone: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    asg_label: Option<String>,
}

impl From<RawInstance> for Instance {
    fn from(raw: RawInstance) -> Self {
        let health = match raw.state.as_deref() {
            Some("terminating") | Some("shutting-down") | Some("terminated") => InstanceHealth::Terminating,
            Some("running") | None => InstanceHealth::InService,
            Some(_) => InstanceHealth::Unhealthy,
        };
        let mut instance = Instance::new(raw.instance_id, raw.private_ip, raw.availability_zone).with_health(health);
        if let Some(label) = raw.asg_label {
            instance = instance.with_asg_label(label);
        }
        instance
    }
}

#[derive(Debug, Deserialize)]
struct AsgGroupsPage {
    groups: Vec<RawAsgGroup>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAsgGroup {
    name: String,
    members: Vec<RawAsgMember>,
}

#[derive(Debug, Deserialize)]
struct RawAsgMember {
    instance_id: String,
    #[serde(default)]
    lifecycle_state: Option<String>,
}

impl RawAsgMember {
    fn is_healthy(&self) -> bool {
        matches!(self.lifecycle_state.as_deref(), Some("InService") | None)
    }
}

/// AWS-like compute/autoscaling provider driven over a plain HTTPS JSON
/// API. Real signing, SDK retry/backoff policy, and wire-format details
/// are deliberately out of scope (see `skyfleet-dns-domain`'s Non-goals);
/// this client carries the request shape real usage needs — paging, a
/// bounded per-request timeout, and bounded retry on timeout — without
/// depending on a full cloud SDK.
pub struct AwsCloudProvider {
    client: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
    secret_key: Option<String>,
    batch_size: usize,
    request_timeout: Duration,
    api_requests: Arc<Counter>,
    api_success: Arc<Counter>,
    api_failure: Arc<Counter>,
}

impl AwsCloudProvider {
    pub fn new(config: &ProviderConfig, stats: &StatsRegistry) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| DomainError::ConfigInvalid(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.effective_endpoint(),
            access_key: config.aws_access_key.clone(),
            secret_key: config.aws_secret_key.clone(),
            batch_size: config.request_batch_size,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            api_requests: stats.create("api_requests"),
            api_success: stats.create("api_success"),
            api_failure: stats.create("api_failure"),
        })
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (&self.access_key, &self.secret_key) {
            (Some(key), Some(secret)) => builder.basic_auth(key, Some(secret)),
            _ => builder,
        }
    }

    /// Issues one paged GET, retrying up to `MAX_PAGER_RETRIES` times on
    /// timeout before the pull fails outright.
    async fn get_page<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, DomainError> {
        self.api_requests.increment(1);

        let mut attempt = 0;
        loop {
            let request = self.authed(self.client.get(format!("{}{}", self.base_url, path)).query(params));
            let outcome = tokio::time::timeout(self.request_timeout, request.send()).await;

            match outcome {
                Ok(Ok(response)) if response.status().is_success() => {
                    let body = response
                        .json::<T>()
                        .await
                        .map_err(|e| DomainError::ProviderUnavailable(format!("malformed response body: {e}")));
                    return match body {
                        Ok(parsed) => {
                            self.api_success.increment(1);
                            Ok(parsed)
                        }
                        Err(e) => {
                            self.api_failure.increment(1);
                            warn!(error = %e, path, "provider response failed to parse");
                            Err(e)
                        }
                    };
                }
                Ok(Ok(response)) => {
                    self.api_failure.increment(1);
                    let status = response.status();
                    warn!(%status, path, "provider returned non-success status");
                    return Err(DomainError::ProviderUnavailable(format!("HTTP {status}")));
                }
                Ok(Err(e)) => {
                    self.api_failure.increment(1);
                    warn!(error = %e, path, "provider request failed");
                    return Err(DomainError::ProviderUnavailable(e.to_string()));
                }
                Err(_) => {
                    attempt += 1;
                    if attempt > MAX_PAGER_RETRIES {
                        self.api_failure.increment(1);
                        warn!(path, attempt, "provider request timed out after max retries");
                        return Err(DomainError::ProviderUnavailable(format!(
                            "request to {path} timed out after {attempt} attempts"
                        )));
                    }
                    debug!(path, attempt, "provider request timed out, retrying");
                }
            }
        }
    }

    fn filter_params(filter: &InstanceFilter) -> Vec<(&'static str, String)> {
        match filter {
            InstanceFilter::All => Vec::new(),
            InstanceFilter::ById(id) => vec![("instance_id", id.clone())],
            InstanceFilter::ByPrivateIp(ip) => vec![("private_ip", ip.clone())],
        }
    }
}

#[async_trait]
impl CloudProvider for AwsCloudProvider {
    async fn list_instances(&self, filter: InstanceFilter) -> Result<Vec<Instance>, DomainError> {
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;
        let base_params = Self::filter_params(&filter);

        loop {
            let mut params = base_params.clone();
            params.push(("max_results", self.batch_size.to_string()));
            if let Some(token) = &next_token {
                params.push(("next_token", token.clone()));
            }

            let page: InstancesPage = self.get_page("/instances", &params).await?;
            instances.extend(page.instances.into_iter().map(Instance::from));

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(instances)
    }

    async fn list_autoscaling_memberships(&self) -> Result<AsgMemberships, DomainError> {
        let mut memberships: AsgMemberships = HashMap::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut params = vec![("max_results", self.batch_size.to_string())];
            if let Some(token) = &next_token {
                params.push(("next_token", token.clone()));
            }

            let page: AsgGroupsPage = self.get_page("/autoscaling-groups", &params).await?;
            for group in page.groups {
                let healthy: HashSet<String> = group
                    .members
                    .into_iter()
                    .filter(RawAsgMember::is_healthy)
                    .map(|m| m.instance_id)
                    .collect();
                memberships.entry(group.name).or_default().extend(healthy);
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(memberships)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_instance_maps_running_state_to_in_service() {
        let raw = RawInstance {
            instance_id: "i-1".into(),
            private_ip: "10.0.0.1".into(),
            availability_zone: "us-east-1a".into(),
            state: Some("running".into()),
            asg_label: None,
        };
        let instance: Instance = raw.into();
        assert_eq!(instance.health, InstanceHealth::InService);
    }

    #[test]
    fn raw_instance_maps_shutting_down_to_terminating() {
        let raw = RawInstance {
            instance_id: "i-2".into(),
            private_ip: "10.0.0.2".into(),
            availability_zone: "us-east-1b".into(),
            state: Some("shutting-down".into()),
            asg_label: None,
        };
        let instance: Instance = raw.into();
        assert_eq!(instance.health, InstanceHealth::Terminating);
    }

    #[test]
    fn asg_member_without_lifecycle_state_defaults_healthy() {
        let member = RawAsgMember {
            instance_id: "i-3".into(),
            lifecycle_state: None,
        };
        assert!(member.is_healthy());
    }

    #[test]
    fn asg_member_out_of_service_is_unhealthy() {
        let member = RawAsgMember {
            instance_id: "i-4".into(),
            lifecycle_state: Some("OutOfService".into()),
        };
        assert!(!member.is_healthy());
    }
}
