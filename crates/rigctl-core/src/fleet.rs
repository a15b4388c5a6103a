// ── Fleet scheduler ──
//
// The outer control loop: resolve the schedule window, fan the cycle
// runner out over the inventory with bounded concurrency, then sleep
// until the next band transition. A batch fully drains before the next
// window is computed. Runner failures never abort a batch; nothing here
// is fatal to the process.

use std::sync::Arc;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use rigctl_api::{MinerClient, TransportConfig};

use crate::config::FleetConfig;
use crate::cycle::CycleRunner;
use crate::error::CoreError;
use crate::schedule::{self, ScheduleWindow};
use crate::session::SessionManager;

/// Drives the whole fleet through schedule-aligned control cycles.
pub struct FleetScheduler {
    config: FleetConfig,
    runner: Arc<CycleRunner>,
}

impl FleetScheduler {
    /// Build a scheduler with default transport tuning (the configured
    /// per-request timeout, 1 s backoff unit).
    pub fn new(config: FleetConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        Self::with_transport(config, &transport)
    }

    /// Build a scheduler with explicit transport tuning. Tests use this
    /// to shrink the backoff unit.
    pub fn with_transport(
        config: FleetConfig,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let client = Arc::new(MinerClient::new(config.base_url.clone(), transport)?);
        let sessions = Arc::new(SessionManager::new(Arc::clone(&client), config.max_attempts));
        let runner = Arc::new(CycleRunner::new(client, sessions, config.max_attempts));
        Ok(Self { config, runner })
    }

    /// Run the control loop.
    ///
    /// Loops forever unless `config.cycles` bounds the number of
    /// completed cycles. Per-device failures are logged inside the batch
    /// and never surface here.
    pub async fn run(&self) {
        let mut completed: u64 = 0;

        loop {
            let window = schedule::current();
            info!(
                profile = %window.profile,
                curtail = %window.curtail_mode,
                next_transition = %window.next_transition,
                miners = self.config.miners.len(),
                "dispatching control cycle"
            );

            self.dispatch(&window).await;
            completed += 1;

            let remaining = window.next_transition - Utc::now();
            info!(
                now = %Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                minutes_until_transition = remaining.num_minutes(),
                "completed one cycle"
            );

            if self.config.cycles.is_some_and(|limit| completed >= limit) {
                info!(completed, "cycle limit reached, stopping");
                return;
            }

            match remaining.to_std() {
                Ok(sleep) => tokio::time::sleep(sleep).await,
                // Transition already passed while the batch ran.
                Err(_) => debug!("next transition already past, dispatching immediately"),
            }
        }
    }

    /// Fan the cycle runner out over the inventory, at most
    /// `max_workers` devices in flight, and wait for the batch to drain.
    async fn dispatch(&self, window: &ScheduleWindow) {
        let limit = self.config.max_workers.max(1);

        stream::iter(self.config.miners.iter())
            .for_each_concurrent(limit, |miner| {
                let runner = Arc::clone(&self.runner);
                async move {
                    let report = runner.run(miner, window).await;
                    if report.is_clean() {
                        debug!(%miner, "cycle completed cleanly");
                    } else {
                        warn!(%miner, ?report, "cycle completed with failures");
                    }
                }
            })
            .await;
    }
}
