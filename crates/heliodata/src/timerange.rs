//! Time ranges and bucket enumeration.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ScrapeError, ScrapeResult};

/// Date granularity of a compiled URL template, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Resolution {
    /// Floor an instant to the start of its bucket at this resolution.
    pub fn floor(self, t: NaiveDateTime) -> NaiveDateTime {
        let date = t.date();
        match self {
            Resolution::Year => midnight(ymd(date.year(), 1, 1)),
            Resolution::Month => midnight(ymd(date.year(), date.month(), 1)),
            Resolution::Day => midnight(date),
            Resolution::Hour => date
                .and_hms_opt(t.hour(), 0, 0)
                .unwrap_or_else(|| midnight(date)),
            Resolution::Minute => date
                .and_hms_opt(t.hour(), t.minute(), 0)
                .unwrap_or_else(|| midnight(date)),
            Resolution::Second => t.with_nanosecond(0).unwrap_or(t),
        }
    }

    /// The start of the bucket after `t`, or `None` past chrono's range.
    ///
    /// Year and month steps use calendar arithmetic, not fixed durations.
    pub fn step(self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Resolution::Year => t.checked_add_months(Months::new(12)),
            Resolution::Month => t.checked_add_months(Months::new(1)),
            Resolution::Day => t.checked_add_signed(Duration::days(1)),
            Resolution::Hour => t.checked_add_signed(Duration::hours(1)),
            Resolution::Minute => t.checked_add_signed(Duration::minutes(1)),
            Resolution::Second => t.checked_add_signed(Duration::seconds(1)),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

/// Inclusive `[start, end]` pair of time instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> ScrapeResult<Self> {
        if start > end {
            return Err(ScrapeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whether `t` lies within the range, endpoints included.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t <= self.end
    }

    /// Enumerate the buckets covering this range at `resolution`.
    ///
    /// The sequence is finite, lazy, and restartable (call again for a
    /// fresh iterator). Both endpoints are inclusive: the first bucket is
    /// `start` floored to the resolution and the last is `end` floored,
    /// so a final partial bucket is always included. A degenerate range
    /// yields exactly one bucket.
    pub fn buckets(&self, resolution: Resolution) -> Buckets {
        Buckets {
            next: Some(resolution.floor(self.start)),
            last: resolution.floor(self.end),
            resolution,
        }
    }
}

/// Lazy iterator over the strictly increasing buckets of a [`TimeRange`].
#[derive(Debug, Clone)]
pub struct Buckets {
    next: Option<NaiveDateTime>,
    last: NaiveDateTime,
    resolution: Resolution,
}

impl Iterator for Buckets {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<NaiveDateTime> {
        let current = self.next?;
        if current > self.last {
            self.next = None;
            return None;
        }
        self.next = self.resolution.step(current);
        Some(current)
    }
}
