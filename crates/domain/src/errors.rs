use thiserror::Error;

/// Error kinds that cross a function boundary as `Result`.
///
/// Per the engine's error model, `CacheMiss` and `Throttled` are *not*
/// represented here — both are normal, expected outcomes surfaced as
/// `ok=false` from `Resolve*`, never as an `Err`.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("provider request failed: {0}")]
    ProviderUnavailable(String),

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("failed to read config file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
