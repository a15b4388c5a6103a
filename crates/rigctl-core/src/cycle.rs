// ── Device cycle runner ──
//
// Drives one miner through login -> curtail -> profile -> logout. Each
// step is fault-isolated: a failed setter is logged and the remaining
// steps still run. Only a failed login short-circuits, since nothing
// downstream can work without a token.

use std::sync::Arc;

use tracing::{error, info, warn};

use rigctl_api::{CurtailMode, MinerAddr, MinerClient, Profile, RequestOutcome};

use crate::error::CoreError;
use crate::schedule::ScheduleWindow;
use crate::session::{SessionManager, SessionToken};

/// Outcome of one step within a device cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step took effect (including "already set" no-ops).
    Applied,
    /// The step was never attempted (login failed earlier).
    Skipped,
    /// The step was attempted and failed; later steps still ran.
    Failed,
}

/// Per-device summary of one control cycle. Failures stay inside the
/// report -- they never propagate to sibling devices or the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub login: StepStatus,
    pub curtail: StepStatus,
    pub profile: StepStatus,
    pub logout: StepStatus,
}

impl CycleReport {
    fn skipped() -> Self {
        Self {
            login: StepStatus::Failed,
            curtail: StepStatus::Skipped,
            profile: StepStatus::Skipped,
            logout: StepStatus::Skipped,
        }
    }

    /// True when every step of the cycle took effect.
    pub fn is_clean(&self) -> bool {
        [self.login, self.curtail, self.profile, self.logout]
            .iter()
            .all(|s| *s == StepStatus::Applied)
    }
}

/// Which setter to apply. Both share the unauthorized-recovery protocol,
/// so the runner treats them uniformly.
#[derive(Debug, Clone, Copy)]
enum Setter {
    Curtail(CurtailMode),
    Profile(Profile),
}

impl Setter {
    fn operation(self) -> &'static str {
        match self {
            Self::Curtail(_) => "curtail",
            Self::Profile(_) => "profileset",
        }
    }

    async fn dispatch(
        self,
        client: &MinerClient,
        token: &str,
        max_attempts: u32,
    ) -> RequestOutcome {
        match self {
            Self::Curtail(mode) => client.set_curtail(token, mode, max_attempts).await,
            Self::Profile(profile) => client.set_profile(token, profile, max_attempts).await,
        }
    }
}

/// Runs the four-step control cycle for a single miner.
pub struct CycleRunner {
    client: Arc<MinerClient>,
    sessions: Arc<SessionManager>,
    max_attempts: u32,
}

impl CycleRunner {
    pub fn new(client: Arc<MinerClient>, sessions: Arc<SessionManager>, max_attempts: u32) -> Self {
        Self {
            client,
            sessions,
            max_attempts,
        }
    }

    /// Run one full cycle against `miner`, targeting `window`'s state.
    ///
    /// Never returns an error: every failure is logged and folded into
    /// the report.
    pub async fn run(&self, miner: &MinerAddr, window: &ScheduleWindow) -> CycleReport {
        let Some(token) = self.sessions.login(miner).await else {
            error!(%miner, "no token received, skipping remaining steps");
            return CycleReport::skipped();
        };

        let mut report = CycleReport {
            login: StepStatus::Applied,
            ..CycleReport::skipped()
        };

        report.curtail = self
            .step(miner, &token, Setter::Curtail(window.curtail_mode))
            .await;
        report.profile = self
            .step(miner, &token, Setter::Profile(window.profile))
            .await;

        report.logout = if self.sessions.logout(miner).await {
            StepStatus::Applied
        } else {
            StepStatus::Failed
        };

        report
    }

    /// Apply one setter, logging the result and folding errors into a
    /// `StepStatus` so siblings are unaffected.
    async fn step(&self, miner: &MinerAddr, token: &SessionToken, setter: Setter) -> StepStatus {
        match self.apply(miner, token, setter).await {
            Ok(()) => StepStatus::Applied,
            Err(e) => {
                error!(%miner, operation = setter.operation(), error = %e, "step failed");
                StepStatus::Failed
            }
        }
    }

    /// Apply a setter with the unauthorized-recovery protocol: on a 401,
    /// re-login once and retry the same setter exactly once with the
    /// fresh token. A failed re-login, or a second 401, abandons the
    /// setter for this cycle.
    async fn apply(
        &self,
        miner: &MinerAddr,
        token: &SessionToken,
        setter: Setter,
    ) -> Result<(), CoreError> {
        let operation = setter.operation();

        match setter
            .dispatch(&self.client, &token.value, self.max_attempts)
            .await
        {
            RequestOutcome::Success(_) => {
                info!(%miner, operation, "applied");
                return Ok(());
            }
            RequestOutcome::Ignored(message) => {
                info!(%miner, operation, %message, "already applied");
                return Ok(());
            }
            RequestOutcome::Unauthorized => {
                warn!(%miner, operation, "unauthorized token, attempting re-login");
            }
            RequestOutcome::Failed(reason) => {
                return Err(CoreError::StepFailure {
                    miner: miner.to_string(),
                    operation,
                    reason,
                });
            }
        }

        let Some(fresh) = self.sessions.login(miner).await else {
            return Err(CoreError::AuthFailure {
                miner: miner.to_string(),
                reason: format!("re-login failed, abandoning {operation} this cycle"),
            });
        };

        match setter
            .dispatch(&self.client, &fresh.value, self.max_attempts)
            .await
        {
            RequestOutcome::Success(_) | RequestOutcome::Ignored(_) => {
                info!(%miner, operation, "applied after re-login");
                Ok(())
            }
            RequestOutcome::Unauthorized => Err(CoreError::StepFailure {
                miner: miner.to_string(),
                operation,
                reason: "still unauthorized after re-login".into(),
            }),
            RequestOutcome::Failed(reason) => Err(CoreError::StepFailure {
                miner: miner.to_string(),
                operation,
                reason,
            }),
        }
    }
}
