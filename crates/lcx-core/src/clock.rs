//! # Clock
//!
//! "Today" is the only time-dependent input to examination (expiry,
//! presentation deadlines). It is injected through [`Clock`] so a run can be
//! replayed with identical results.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Source of the current date and time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current UTC instant (audit timestamps).
    fn now(&self) -> DateTime<Utc>;

    /// Examination date used for every date comparison.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant. Used for replays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Pin to an instant.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Pin to midday UTC of a date.
    pub fn on(date: NaiveDate) -> Self {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        Self {
            instant: date.and_time(noon).and_utc(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
