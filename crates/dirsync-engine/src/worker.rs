//! Polling worker.
//!
//! Drives the engine either once or on a fixed interval. Cycle failures in
//! continuous mode are recoverable: they are logged and the loop keeps
//! going. Cancellation is cooperative; an in-flight cycle finishes, only
//! the inter-cycle wait is interruptible.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use dirsync_core::SyncResult;

use crate::engine::SyncEngine;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Wait between reconciliation cycles.
    pub sync_interval: Duration,

    /// Run exactly one cycle, then signal shutdown.
    pub run_once: bool,

    /// Report decisions without mutating the target.
    pub dry_run: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(300),
            run_once: false,
            dry_run: false,
        }
    }
}

/// Background worker that runs reconciliation cycles.
pub struct SyncWorker {
    engine: Arc<SyncEngine>,
    config: WorkerConfig,
    shutdown: CancellationToken,
}

impl SyncWorker {
    /// Create a new worker.
    pub fn new(engine: Arc<SyncEngine>, config: WorkerConfig) -> Self {
        Self {
            engine,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token cancelled when the worker asks the host to shut down.
    ///
    /// After a run-once pass the worker cancels this token; the host decides
    /// what process termination looks like.
    #[must_use]
    pub fn shutdown_signal(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run the worker until completion or cancellation.
    ///
    /// An error escaping the per-cycle boundary while cancellation was not
    /// requested is fatal: logged at the highest severity and returned.
    /// Errors observed after cancellation are absorbed; a clean shutdown
    /// wins.
    pub async fn run(&self, cancel: CancellationToken) -> SyncResult<()> {
        match self.execute(&cancel).await {
            Err(e) if !cancel.is_cancelled() => {
                error!(error = %e, "fatal sync worker error");
                Err(e)
            }
            _ => Ok(()),
        }
    }

    async fn execute(&self, cancel: &CancellationToken) -> SyncResult<()> {
        info!(
            run_once = self.config.run_once,
            dry_run = self.config.dry_run,
            interval_secs = self.config.sync_interval.as_secs(),
            "sync worker started"
        );

        if self.config.run_once {
            if let Err(e) = self.engine.run(self.config.dry_run).await {
                error!(error = %e, "sync error");
            }
            info!("single run completed");
            self.shutdown.cancel();
            return Ok(());
        }

        while !cancel.is_cancelled() {
            debug!("starting sync cycle");
            if let Err(e) = self.engine.run(self.config.dry_run).await {
                error!(error = %e, "sync error");
            }

            tokio::select! {
                () = tokio::time::sleep(self.config.sync_interval) => {}
                () = cancel.cancelled() => break,
            }
        }

        info!("sync worker stopped");
        Ok(())
    }
}
