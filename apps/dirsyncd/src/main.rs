//! dirsyncd: the directory synchronization service.
//!
//! Reconciles user records from the authoritative database into the target
//! directory, continuously or as a single pass.

mod config;
mod logging;

use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use config::Config;
use dirsync_connector_database::DatabaseSource;
use dirsync_connector_ldap::LdapDirectory;
use dirsync_core::SyncResult;
use dirsync_engine::{SyncEngine, SyncWorker, WorkerConfig};

/// Directory synchronization service.
#[derive(Debug, Parser)]
#[command(name = "dirsyncd", version, about)]
struct Cli {
    /// Run exactly one reconciliation cycle, then exit.
    #[arg(long)]
    once: bool,

    /// Compute and report decisions without writing to the directory.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        once = cli.once,
        dry_run = cli.dry_run,
        identity_field = %config.identity_field,
        interval_secs = config.sync_interval.as_secs(),
        "starting dirsyncd"
    );

    let worker = match build_worker(&cli, &config) {
        Ok(w) => Arc::new(w),
        Err(e) => {
            error!(error = %e, "failed to initialize repositories");
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let shutdown = worker.shutdown_signal();

    let mut worker_task = tokio::spawn({
        let worker = worker.clone();
        let cancel = cancel.clone();
        async move { worker.run(cancel).await }
    });

    let result = tokio::select! {
        result = &mut worker_task => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, finishing current cycle");
            cancel.cancel();
            worker_task.await
        }
        () = shutdown.cancelled() => worker_task.await,
    };

    match result {
        Ok(Ok(())) => info!("dirsyncd stopped"),
        Ok(Err(e)) => {
            error!(error = %e, "worker terminated with a fatal error");
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "worker task failed");
            std::process::exit(1);
        }
    }
}

/// Wire repositories, engine, and worker from validated configuration.
fn build_worker(cli: &Cli, config: &Config) -> SyncResult<SyncWorker> {
    let source = Arc::new(DatabaseSource::new(config.database.clone())?);
    let target = Arc::new(LdapDirectory::new(
        config.ldap.clone(),
        config.mappings.clone(),
    )?);

    let engine = Arc::new(SyncEngine::new(
        source,
        target,
        config.mappings.clone(),
        config.identity_field,
    ));

    Ok(SyncWorker::new(
        engine,
        WorkerConfig {
            sync_interval: config.sync_interval,
            run_once: cli.once,
            dry_run: cli.dry_run,
        },
    ))
}
