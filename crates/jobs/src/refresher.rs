use std::sync::Arc;
use std::time::Duration;

use skyfleet_dns_application::ResolutionEngine;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Drives `ResolutionEngine::refresh` on a fixed period until cancelled
/// (spec C9). Each tick runs the engine's full
/// `Pulling → RebuildingAsg → RebuildingHosts → TrimmingThrottler → Hook`
/// sequence; failures are logged inside the engine and never stop the
/// loop. Shutdown is observed both between ticks and inside the sleep, so
/// it's never more than one polling grain late.
///
/// The loop's cancellation signal is the engine's own `shutdown_token()`
/// (spec §5: "the engine exposes a shutdown signal") rather than a token
/// private to the job, so `ResolutionEngine::request_shutdown()` stops
/// this loop *and* tells any in-flight miss-fill to skip its cache insert
/// with a single call.
pub struct RefresherJob {
    engine: Arc<ResolutionEngine>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl RefresherJob {
    pub fn new(engine: Arc<ResolutionEngine>, interval_secs: u64) -> Self {
        let shutdown = engine.shutdown_token();
        Self {
            engine,
            interval_secs,
            shutdown,
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "starting inventory refresher");

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            // first tick fires immediately; the engine should see live data
            // before the first configured interval elapses.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("refresher: shutting down");
                        break;
                    }
                    _ = self.engine.refresh() => {}
                }

                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("refresher: shutting down");
                        break;
                    }
                    _ = interval.tick() => {}
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skyfleet_dns_application::ports::CloudProvider;
    use skyfleet_dns_application::services::StatsRegistry;
    use skyfleet_dns_domain::config::EngineConfig;
    use skyfleet_dns_domain::{AsgMemberships, DomainError, Instance, InstanceFilter};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProvider {
        calls: AtomicU32,
    }

    #[async_trait]
    impl CloudProvider for CountingProvider {
        async fn list_instances(&self, _filter: InstanceFilter) -> Result<Vec<Instance>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn list_autoscaling_memberships(&self) -> Result<AsgMemberships, DomainError> {
            Ok(std::collections::HashMap::new())
        }
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop_promptly() {
        let provider = Arc::new(CountingProvider { calls: AtomicU32::new(0) });
        let config = EngineConfig::new("aws.test.".into(), "ue1".into(), "tc".into());
        let engine = Arc::new(
            ResolutionEngine::new(config, "10.0.0.0/16", provider, Arc::new(StatsRegistry::new())).unwrap(),
        );

        let job = Arc::new(RefresherJob::new(Arc::clone(&engine), 3600));
        job.start().await;

        tokio::task::yield_now().await;
        engine.request_shutdown();

        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
