// rigctl-core: Orchestration layer between rigctl-api and the CLI.
//
// Owns session/token state, the time-of-day schedule, the per-device
// control cycle, and the bounded-concurrency fleet loop. Never reads
// config files -- the CLI hands in a pre-built `FleetConfig`.

pub mod config;
pub mod cycle;
pub mod error;
pub mod fleet;
pub mod schedule;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::FleetConfig;
pub use cycle::{CycleReport, CycleRunner, StepStatus};
pub use error::CoreError;
pub use fleet::FleetScheduler;
pub use schedule::{resolve, ScheduleWindow};
pub use session::{SessionManager, SessionToken};

// Re-export the wire-level types consumers need at the crate root.
pub use rigctl_api::{CurtailMode, MinerAddr, Profile};
