use fancy_regex::Regex;
use skyfleet_dns_domain::DomainError;

/// Result of a successful forward-name match.
///
/// The second field is named `region` rather than the literal "zoneLetter"
/// the wire format uses: it's populated from the regex's `region` capture,
/// not the instance's actual availability-zone letter (that distinction
/// only shows up later, in hostname composition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMatch {
    pub instance_id: String,
    pub region: String,
}

/// Parses forward names of the form `<region><zone>-<account>-<instanceId>`
/// via a configurable regex with named captures `region`, `zone`,
/// `account`, `instanceId` (spec C4).
pub struct HostMatcher {
    pattern: Regex,
}

impl HostMatcher {
    pub fn new(pattern: &str) -> Result<Self, DomainError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| DomainError::ConfigInvalid(format!("invalid instance regex: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn try_match(&self, host: &str) -> Option<HostMatch> {
        let captures = self.pattern.captures(host).ok().flatten()?;
        let instance_id = captures.name("instanceId")?.as_str();
        let region = captures.name("region")?.as_str();
        Some(HostMatch {
            instance_id: format!("i-{instance_id}"),
            region: region.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfleet_dns_domain::config::DEFAULT_INSTANCE_REGEX;

    #[test]
    fn matches_default_pattern() {
        let matcher = HostMatcher::new(DEFAULT_INSTANCE_REGEX).unwrap();
        let result = matcher.try_match("ue1a-tc-1234567").unwrap();
        assert_eq!(result.instance_id, "i-1234567");
        assert_eq!(result.region, "ue1");
    }

    #[test]
    fn rejects_non_matching_host() {
        let matcher = HostMatcher::new(DEFAULT_INSTANCE_REGEX).unwrap();
        assert!(matcher.try_match("not-a-valid-host!!").is_none());
    }
}
