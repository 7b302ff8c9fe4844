use std::collections::HashSet;

use ipnetwork::Ipv4Network;
use skyfleet_dns_domain::DomainError;

const IN_ADDR_ARPA_SUFFIX: &str = ".in-addr.arpa";

/// Enumerates the `.in-addr.arpa` reverse zones covering a VPC CIDR and
/// reverses PTR query names back into dotted IPv4 (spec C5). Immutable
/// once built.
pub struct ReverseZoneHelper {
    zones: HashSet<String>,
}

impl ReverseZoneHelper {
    /// Rejects CIDRs outside the `/8..=/24` window and enumerates every
    /// `/24` inside the block, one reverse zone per `/24`.
    pub fn init_from_cidr(cidr: &str) -> Result<Self, DomainError> {
        let network: Ipv4Network = cidr
            .parse()
            .map_err(|e| DomainError::InvalidInput(format!("invalid CIDR {cidr}: {e}")))?;

        let bits = network.prefix();
        if !(8..=24).contains(&bits) {
            return Err(DomainError::InvalidInput(format!(
                "CIDR prefix must be between /8 and /24, got /{bits}"
            )));
        }

        let mut zones = HashSet::new();
        for subnet in network.subnets(24).map_err(|e| {
            DomainError::InvalidInput(format!("failed to enumerate /24s in {cidr}: {e}"))
        })? {
            let octets = subnet.network().octets();
            zones.insert(format!(
                "{}.{}.{}{IN_ADDR_ARPA_SUFFIX}",
                octets[2], octets[1], octets[0]
            ));
        }

        Ok(Self { zones })
    }

    pub fn is_reverse_zone(&self, name: &str) -> bool {
        self.zones.contains(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Concatenates `name` and `zone`, strips the trailing
    /// `.in-addr.arpa`, and byte-reverses the four dotted octets to
    /// recover the original IPv4 address. Returns `None` if the
    /// concatenation is too short to contain the suffix or isn't
    /// dotted-quad shaped once stripped.
    pub fn reverse_lookup_ip(name: &str, zone: &str) -> Option<String> {
        let full = format!("{name}.{zone}");
        if full.len() <= IN_ADDR_ARPA_SUFFIX.len() {
            return None;
        }
        let stripped = &full[..full.len() - IN_ADDR_ARPA_SUFFIX.len()];
        let octets: Vec<&str> = stripped.split('.').collect();
        if octets.len() != 4 {
            return None;
        }
        for octet in &octets {
            if octet.parse::<u8>().is_err() {
                return None;
            }
        }
        Some(format!("{}.{}.{}.{}", octets[3], octets[2], octets[1], octets[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_every_slash_24_in_block() {
        let helper = ReverseZoneHelper::init_from_cidr("10.1.0.0/22").unwrap();
        assert_eq!(helper.len(), 4);
        for zone in [
            "0.1.10.in-addr.arpa",
            "1.1.10.in-addr.arpa",
            "2.1.10.in-addr.arpa",
            "3.1.10.in-addr.arpa",
        ] {
            assert!(helper.is_reverse_zone(zone), "missing {zone}");
        }
        assert!(!helper.is_reverse_zone("4.1.10.in-addr.arpa"));
    }

    #[test]
    fn rejects_cidr_outside_mask_window() {
        assert!(ReverseZoneHelper::init_from_cidr("10.0.0.0/28").is_err());
        assert!(ReverseZoneHelper::init_from_cidr("10.0.0.0/4").is_err());
    }

    #[test]
    fn reverse_lookup_recovers_dotted_quad() {
        let ip = ReverseZoneHelper::reverse_lookup_ip("3", "2.1.10.in-addr.arpa").unwrap();
        assert_eq!(ip, "10.1.2.3");
    }

    #[test]
    fn reverse_lookup_rejects_too_short_input() {
        assert!(ReverseZoneHelper::reverse_lookup_ip("", "x").is_none());
    }
}
