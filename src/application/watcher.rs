//! Snapshot Watcher
//!
//! Re-runs the pipeline on a fixed interval. A failed run is logged and the
//! previous snapshot on disk is left in place until the next successful one.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};

use super::pipeline::{RunSummary, SnapshotPipeline};
use crate::ports::market_data::MarketDataPort;

/// Default refresh interval (15 minutes)
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(900);

/// Status snapshot of the watcher
#[derive(Debug, Clone, Default)]
pub struct WatcherStatus {
    pub is_running: bool,
    pub runs: u64,
    pub failures: u64,
    pub last_summary: Option<RunSummary>,
}

pub struct SnapshotWatcher<M: MarketDataPort> {
    pipeline: Arc<SnapshotPipeline<M>>,
    path: PathBuf,
    interval: Duration,
    is_running: Arc<RwLock<bool>>,
    status: Arc<RwLock<WatcherStatus>>,
    shutdown: Arc<Notify>,
}

impl<M: MarketDataPort> SnapshotWatcher<M> {
    pub fn new(pipeline: SnapshotPipeline<M>, path: PathBuf) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            path,
            interval: DEFAULT_WATCH_INTERVAL,
            is_running: Arc::new(RwLock::new(false)),
            status: Arc::new(RwLock::new(WatcherStatus::default())),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Set custom refresh interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `stop` is called. The first run starts immediately.
    pub async fn run(&self) {
        *self.is_running.write().await = true;
        tracing::info!(
            "Watching {} - refresh interval: {:?}",
            self.path.display(),
            self.interval
        );

        while *self.is_running.read().await {
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.notified() => break,
            }
        }

        *self.is_running.write().await = false;
        tracing::info!("Watcher stopped");
    }

    /// One pipeline run. Errors are recorded, never propagated.
    pub async fn tick(&self) {
        let result = self.pipeline.run(&self.path).await;

        let mut status = self.status.write().await;
        status.runs += 1;
        match result {
            Ok(report) => status.last_summary = Some(report.summary),
            Err(e) => {
                status.failures += 1;
                tracing::error!("Snapshot run failed: {}", e);
            }
        }
    }

    pub async fn stop(&self) {
        *self.is_running.write().await = false;
        self.shutdown.notify_one();
        tracing::info!("Watcher stop requested");
    }

    pub async fn status(&self) -> WatcherStatus {
        let mut status = self.status.read().await.clone();
        status.is_running = *self.is_running.read().await;
        status
    }
}

impl<M: MarketDataPort> Clone for SnapshotWatcher<M> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            path: self.path.clone(),
            interval: self.interval,
            is_running: Arc::clone(&self.is_running),
            status: Arc::clone(&self.status),
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}
