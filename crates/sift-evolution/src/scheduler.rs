//! Fixed-interval scheduler for continuous mode.
//!
//! Cycles run to completion on a blocking thread (the pipeline, including
//! the oracle's blocking HTTP calls, is synchronous by design); the
//! inter-cycle sleep is raced against ctrl-c so a cancellation ends the
//! sleep immediately and the process exits cleanly instead of mid-cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{error, info};

use sift_core::errors::SiftResult;
use sift_core::models::CycleSummary;

use crate::engine::EvolutionEngine;

pub struct Scheduler {
    engine: Arc<EvolutionEngine>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(engine: EvolutionEngine, interval: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            interval,
        }
    }

    /// Run cycles until a shutdown signal arrives. `on_cycle` is invoked
    /// with every summary, including degraded ones. Strictly single-flight:
    /// the next cycle starts only after the previous one's sleep.
    pub async fn run<F>(&self, mut on_cycle: F) -> SiftResult<()>
    where
        F: FnMut(&CycleSummary),
    {
        let stop_requested = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        {
            let stop_requested = stop_requested.clone();
            let wake = wake.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("shutdown signal received");
                    stop_requested.store(true, Ordering::SeqCst);
                    wake.notify_waiters();
                }
            });
        }

        let mut cycle = 0u64;
        loop {
            cycle += 1;
            info!(cycle, "starting scheduled evolution cycle");

            let engine = self.engine.clone();
            let summary = match tokio::task::spawn_blocking(move || engine.run_cycle()).await {
                Ok(summary) => summary,
                Err(join_error) => {
                    error!(error = %join_error, "evolution cycle aborted");
                    let mut summary = CycleSummary::new();
                    summary.notes.push(format!("cycle aborted: {join_error}"));
                    summary
                }
            };
            on_cycle(&summary);

            if stop_requested.load(Ordering::SeqCst) {
                info!("stopping scheduler after completed cycle");
                break;
            }

            info!(sleep_secs = self.interval.as_secs(), "sleeping until next cycle");
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = wake.notified() => {
                    info!("sleep interrupted; stopping scheduler");
                    break;
                }
            }
        }
        Ok(())
    }
}
