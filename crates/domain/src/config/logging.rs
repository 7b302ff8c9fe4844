use serde::{Deserialize, Serialize};

/// Logging setup, consumed by the CLI bootstrap when it builds the
/// `tracing` subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// When set, logs additionally go to this file alongside stderr.
    #[serde(default)]
    pub log_path: Option<String>,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_path: None,
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
