use crate::errors::DomainError;

/// Validates a VPC CIDR against the `8..=24` mask-length window C5 accepts.
/// Does not enumerate zones — that's `ReverseZoneHelper::init_from_cidr`'s job.
pub fn validate_vpc_cidr(cidr: &str) -> Result<(), DomainError> {
    let network: ipnetwork::Ipv4Network = cidr
        .parse()
        .map_err(|e| DomainError::InvalidInput(format!("invalid CIDR {cidr}: {e}")))?;

    let bits = network.prefix();
    if !(8..=24).contains(&bits) {
        return Err(DomainError::InvalidInput(format!(
            "CIDR prefix must be between /8 and /24, got /{bits}"
        )));
    }
    Ok(())
}

/// Rejects blank required CLI/config strings (`zoneName`, `accountName`, …).
pub fn validate_non_empty(name: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::ConfigInvalid(format!("{name} must not be empty")));
    }
    Ok(())
}
