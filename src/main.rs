//! lookupd
//!
//! Runs the lookup daemon under a host service supervisor.
//!
//! # Architecture Overview
//!
//! ```text
//!   supervisor ──start──▶ ServiceAdapter ──▶ ConfigResolver ──▶ LookupDaemon::run (blocks)
//!   SIGTERM ────stop───▶ ServiceAdapter ──▶ ShutdownWatchdog ──▶ LookupDaemon::shutdown
//!                                               │
//!                                               └── deadline exceeded → exit(1)
//! ```

use std::sync::Arc;

use clap::Parser;

use lookupd::cli::Cli;
use lookupd::lifecycle::signals::supervise_signals;
use lookupd::lifecycle::{LifecycleError, ServiceAdapter, ServiceState, StartOutcome};
use lookupd::observability::logging;
use lookupd::LookupDaemon;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let log_level = logging::init(cli.verbose);

    let adapter = Arc::new(
        ServiceAdapter::new(cli.start_request(), LookupDaemon::new).with_log_level(log_level),
    );

    let supervisor = {
        let adapter = Arc::clone(&adapter);
        tokio::spawn(async move {
            if let Err(err) = supervise_signals(adapter.as_ref()).await {
                exit_fatal(&err);
            }
        })
    };

    match adapter.start().await {
        Ok(StartOutcome::VersionRequested(version)) => {
            println!("{}", version);
            std::process::exit(0);
        }
        Ok(StartOutcome::Completed | StartOutcome::StoppedBeforeRun) => {}
        Err(err) if err.is_fatal() => exit_fatal(&err),
        Err(err) => tracing::warn!(error = %err, "Start ignored"),
    }

    // The run-loop returned because a stop is under way; let it finish.
    if adapter.state() == ServiceState::Stopping {
        if let Err(err) = supervisor.await {
            tracing::error!(error = %err, "Signal supervisor failed while stopping");
            eprintln!("FATAL: signal supervisor failed: {}", err);
            std::process::exit(1);
        }
    } else {
        supervisor.abort();
    }

    tracing::info!("Shutdown complete");
}

fn exit_fatal(err: &LifecycleError) -> ! {
    tracing::error!(error = %err, "Fatal");
    eprintln!("FATAL: {}", err);
    std::process::exit(err.exit_code());
}
