//! Inclusive publication window computed from a number of months.

use chrono::{DateTime, Datelike, Months, TimeZone};
use tracing::debug;

/// An inclusive `[start, end]` window of publication timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> DateRange<Tz> {
    /// Window covering the current month of `now` and the `number_of_months - 1`
    /// whole months before it.
    ///
    /// `end` is `now`. `start` is `now` moved back `number_of_months - 1` months
    /// with the day forced to the 1st; the time of day is kept. A
    /// `number_of_months` of 0 is treated as 1.
    pub fn months_back(now: DateTime<Tz>, number_of_months: u32) -> Self {
        let back = Months::new(number_of_months.saturating_sub(1));
        let local = now.naive_local();
        // Day 1 always exists, so only the month subtraction can fail.
        let start_local = local
            .checked_sub_months(back)
            .and_then(|d| d.with_day(1))
            .unwrap_or(local);

        let tz = now.timezone();
        let start = tz
            .from_local_datetime(&start_local)
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&start_local));

        debug!(start = ?start_local, end = ?local, number_of_months, "Computed date range");
        Self { start, end: now }
    }

    /// Whether `at` lies inside the window, bounds included.
    pub fn contains<Other: TimeZone>(&self, at: &DateTime<Other>) -> bool {
        self.start <= *at && *at <= self.end
    }
}
