//! Scheduled sync command.

use super::sync::{build_engine, print_report};
use crate::settings::{CliError, OutputFormat, Settings};
use namesync_engine::{FollowerTarget, MasterSource, ReconcileEngine, SyncError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Runs immediately, then every interval until Ctrl+C.
///
/// A failure of the first run is returned; later failures are logged and
/// the schedule continues. With a zero interval this is a single run.
pub async fn run(settings: &Settings, format: OutputFormat) -> Result<(), CliError> {
    let engine = Arc::new(build_engine(settings)?);

    let Some(period) = settings.interval() else {
        let report = engine.run().await?;
        print_report(&report, format)?;
        info!("Single sync completed. Exiting.");
        return Ok(());
    };

    let (stop_tx, stop_rx) = watch::channel(false);
    let signal = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping the scheduler");
                engine.cancel();
                let _ = stop_tx.send(true);
            }
        }
    });

    let result = schedule(&engine, period, format, stop_rx).await;
    signal.abort();
    result
}

async fn schedule<M: MasterSource, F: FollowerTarget>(
    engine: &ReconcileEngine<M, F>,
    period: Duration,
    format: OutputFormat,
    mut stop: watch::Receiver<bool>,
) -> Result<(), CliError> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately.
    ticker.tick().await;
    match engine.run().await {
        Ok(report) => print_report(&report, format)?,
        Err(SyncError::Cancelled) => return Ok(()),
        Err(e) => return Err(e.into()),
    }

    info!("Scheduling sync every {} minutes", period.as_secs() / 60);
    info!("Sync scheduler running. Press Ctrl+C to exit.");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            Ok(()) = stop.changed() => break,
        }

        match engine.run().await {
            Ok(report) => print_report(&report, format)?,
            Err(SyncError::Cancelled) => break,
            Err(e) => error!("Scheduled sync failed: {e}"),
        }
    }

    info!("Sync scheduler stopped");
    Ok(())
}
