//! Weekly and monthly retention buckets
//!
//! Pure functions of the reference instant and the retention rules.
//! Weekly buckets step back in fixed seven-day increments; monthly buckets
//! use calendar-month arithmetic, so their widths vary with month length.

use chrono::{DateTime, Duration, Months, Utc};

use crate::rules::RetentionRules;

/// Half-open time window: `start` inclusive, `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Whether a timestamp falls inside this window
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// All bucket boundaries for one classification run
///
/// Built fresh per run from `now` and the database's rules; discarded
/// afterwards.
#[derive(Debug, Clone)]
pub struct IntervalSet {
    /// Files at or after this instant are kept unconditionally
    pub keep_all_cutoff: DateTime<Utc>,
    /// Weekly buckets, newest first
    pub weekly: Vec<TimeInterval>,
    /// Monthly buckets, newest first
    pub monthly: Vec<TimeInterval>,
    /// Old edge of the oldest weekly bucket
    pub weeks_cutoff: DateTime<Utc>,
    /// Old edge of the oldest monthly bucket
    pub months_cutoff: DateTime<Utc>,
    /// Oldest instant any file can still be retained
    pub global_cutoff: DateTime<Utc>,
}

impl IntervalSet {
    /// Build bucket boundaries from the reference instant and the rules.
    pub fn build(now: DateTime<Utc>, rules: &RetentionRules) -> Self {
        let keep_all_cutoff = now - Duration::days(i64::from(rules.retain_all_days));

        let weekly: Vec<TimeInterval> = (0..rules.weekly_backups)
            .map(|i| TimeInterval {
                start: keep_all_cutoff - Duration::days(7 * (i64::from(i) + 1)),
                end: keep_all_cutoff - Duration::days(7 * i64::from(i)),
            })
            .collect();

        let monthly: Vec<TimeInterval> = (0..rules.monthly_backups)
            .map(|i| TimeInterval {
                start: sub_months(keep_all_cutoff, i + 1),
                end: sub_months(keep_all_cutoff, i),
            })
            .collect();

        let weeks_cutoff =
            keep_all_cutoff - Duration::days(7 * i64::from(rules.weekly_backups));
        let months_cutoff = sub_months(keep_all_cutoff, rules.monthly_backups);
        let global_cutoff = weeks_cutoff.min(months_cutoff);

        Self {
            keep_all_cutoff,
            weekly,
            monthly,
            weeks_cutoff,
            months_cutoff,
            global_cutoff,
        }
    }
}

/// Calendar-month subtraction, clamping the day to the target month's length
fn sub_months(ts: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    ts.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
