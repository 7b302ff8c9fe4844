mod engine;
mod logging;
mod provider;
mod root;

pub use engine::{EngineConfig, DEFAULT_INSTANCE_REGEX};
pub use logging::LoggingConfig;
pub use provider::ProviderConfig;
pub use root::{CliOverrides, Config};
