//! Periodic probe scheduling.
//!
//! # States
//! ```text
//! Idle → Running: spawn; the first tick fires immediately
//! Running: every tick launches a pass in the background
//! Running → Stopped: shutdown signal (or its sender dropped)
//! ```
//!
//! # Design Decisions
//! - Passes are fire-and-forget; a slow pass may overlap the next one
//! - Shutdown stops new passes only; in-flight passes run to completion

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::health::runner::ProbeRunner;

pub struct ProbeScheduler;

impl ProbeScheduler {
    /// Start the scheduling loop on `runtime`.
    pub fn spawn(
        runtime: &Handle,
        runner: ProbeRunner,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        runtime.spawn(async move {
            tracing::info!(
                runner = ?runner,
                interval_secs = interval.as_secs(),
                "Probe scheduler starting"
            );

            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => {
                        tracing::info!(runner = ?runner, "Probe scheduler received shutdown signal, exiting loop");
                        break;
                    }
                    _ = ticker.tick() => {
                        let pass = runner.clone();
                        tokio::spawn(async move {
                            pass.run_pass().await;
                        });
                    }
                }
            }
        })
    }
}
