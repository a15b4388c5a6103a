// ── Time-of-day schedule ──
//
// The day is partitioned into four fixed 6-hour UTC bands, each mapping
// to a (profile, curtail mode) pair. Pure functions of a passed-in
// instant; callers re-resolve on every cycle since "now" moves.

use chrono::{DateTime, Days, NaiveTime, TimeZone, Timelike, Utc};

use rigctl_api::{CurtailMode, Profile};

/// The target state for the current schedule band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub profile: Profile,
    pub curtail_mode: CurtailMode,
    /// Start of the next band. Strictly after the instant this window
    /// was resolved from; the evening band wraps to the next day's
    /// midnight.
    pub next_transition: DateTime<Utc>,
}

/// Resolve the schedule window containing `now`.
///
/// Bands: `[0,6)` overclock/active, `[6,12)` normal/active,
/// `[12,18)` underclock/active, `[18,24)` normal/sleep.
pub fn resolve(now: DateTime<Utc>) -> ScheduleWindow {
    let (profile, curtail_mode, boundary_hour) = match now.hour() {
        0..=5 => (Profile::Overclock, CurtailMode::Active, 6),
        6..=11 => (Profile::Normal, CurtailMode::Active, 12),
        12..=17 => (Profile::Underclock, CurtailMode::Active, 18),
        _ => (Profile::Normal, CurtailMode::Sleep, 24),
    };

    let next_transition = band_start(now, boundary_hour);

    ScheduleWindow {
        profile,
        curtail_mode,
        next_transition,
    }
}

/// Resolve the window for the current wall-clock instant.
pub fn current() -> ScheduleWindow {
    resolve(Utc::now())
}

/// The instant at which the band starting at `hour` begins, relative to
/// `now`'s UTC date. Hour 24 means midnight of the following day -- the
/// date advances, not just the hour.
fn band_start(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let (date, hour) = if hour == 24 {
        // Valid for every chrono date in this calendar range.
        let next = now
            .date_naive()
            .checked_add_days(Days::new(1))
            .unwrap_or_else(|| now.date_naive());
        (next, 0)
    } else {
        (now.date_naive(), hour)
    };

    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(time))
}
