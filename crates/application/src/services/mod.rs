pub mod host_matcher;
pub mod k_random;
pub mod reverse_zone;
pub mod stats;
pub mod throttler;
pub mod ttl_cache;

pub use host_matcher::{HostMatch, HostMatcher};
pub use reverse_zone::ReverseZoneHelper;
pub use stats::{Counter, StatsRegistry};
pub use throttler::Throttler;
pub use ttl_cache::Cache;
