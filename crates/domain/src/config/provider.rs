use serde::{Deserialize, Serialize};

/// Credentials and HTTP-layer knobs for the concrete `CloudProvider`
/// (spec §6 config table). The engine itself never reads these — they're
/// consumed entirely by the infrastructure-layer provider construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub aws_access_key: Option<String>,
    #[serde(default)]
    pub aws_secret_key: Option<String>,
    #[serde(default)]
    pub credentials_file: Option<String>,

    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,

    /// Overrides the provider's compute-API base URL. Providers derive a
    /// default from `region` when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_batch_size")]
    pub request_batch_size: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            aws_access_key: None,
            aws_secret_key: None,
            credentials_file: None,
            region: None,
            region_code: None,
            profile_name: None,
            endpoint: None,
            request_batch_size: default_batch_size(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ProviderConfig {
    /// Region-code shorthand used in hostname composition when the config
    /// doesn't supply an explicit `region_code` override — ported from the
    /// original `CloudDnsConfig::TryLoad`'s region table.
    pub fn region_code_for(region: &str) -> Option<&'static str> {
        Some(match region {
            "us-east-1" => "ue1",
            "us-west-1" => "uw1",
            "us-west-2" => "uw2",
            "ap-northeast-1" => "an1",
            "ap-northeast-2" => "an2",
            "ap-southeast-1" => "as1",
            "ap-southeast-2" => "as2",
            "eu-west-1" => "ew1",
            "eu-central-1" => "ec1",
            "sa-east-1" => "se1",
            _ => return None,
        })
    }

    /// Resolves the effective region code: explicit override wins, then
    /// the region table, then — mirroring the original's `region =
    /// "us-east-1"` absent-key default — `"ue1"` when no `region` key
    /// was given at all. Only an unrecognized `region` value yields
    /// `None`.
    pub fn effective_region_code(&self) -> Option<&str> {
        if let Some(r) = self.region_code.as_deref() {
            return Some(r);
        }
        match self.region.as_deref() {
            Some(region) => Self::region_code_for(region),
            None => Self::region_code_for("us-east-1"),
        }
    }

    /// Resolves the compute-API base URL: explicit `endpoint` wins,
    /// otherwise a region-qualified default.
    pub fn effective_endpoint(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        let region = self.region.as_deref().unwrap_or("us-east-1");
        format!("https://ec2.{region}.amazonaws.com")
    }
}

fn default_provider() -> String {
    "aws".to_string()
}

fn default_batch_size() -> usize {
    200
}

fn default_request_timeout_ms() -> u64 {
    1000
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_region_defaults_to_us_east_1_code() {
        let config = ProviderConfig::default();
        assert_eq!(config.effective_region_code(), Some("ue1"));
    }

    #[test]
    fn known_region_maps_to_its_code() {
        let config = ProviderConfig {
            region: Some("us-west-2".into()),
            ..ProviderConfig::default()
        };
        assert_eq!(config.effective_region_code(), Some("uw2"));
    }

    #[test]
    fn region_code_wins_over_region_table() {
        let config = ProviderConfig {
            region: Some("us-west-2".into()),
            region_code: Some("zz9".into()),
            ..ProviderConfig::default()
        };
        assert_eq!(config.effective_region_code(), Some("zz9"));
    }

    #[test]
    fn unrecognized_region_yields_none() {
        let config = ProviderConfig {
            region: Some("mars-north-1".into()),
            ..ProviderConfig::default()
        };
        assert_eq!(config.effective_region_code(), None);
    }
}
