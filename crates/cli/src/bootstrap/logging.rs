use skyfleet_dns_domain::config::LoggingConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Builds the process-wide `tracing` subscriber from `LoggingConfig`.
/// The core crates never touch this — logging lifecycle is entirely a
/// host-shim concern, kept here the way the teacher keeps it in its own
/// `bootstrap::init_logging`.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_target(true).with_level(true).with_env_filter(filter);

    if config.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(log_level = %config.log_level, log_path = ?config.log_path, "logging initialized");
}
