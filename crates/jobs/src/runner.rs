use std::sync::Arc;

use tracing::info;

use crate::RefresherJob;

/// Central orchestrator for background jobs. Currently holds the single
/// inventory refresher, but kept as its own type so host startup doesn't
/// need to know how many background jobs the engine runs.
pub struct JobRunner {
    refresher: Option<RefresherJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self { refresher: None }
    }

    pub fn with_refresher(mut self, job: RefresherJob) -> Self {
        self.refresher = Some(job);
        self
    }

    pub async fn start(self) {
        info!("starting background job runner");

        if let Some(job) = self.refresher {
            Arc::new(job).start().await;
        }

        info!("all background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
