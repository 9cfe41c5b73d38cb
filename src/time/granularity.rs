// src/time/granularity.rs
use crate::query::QueryError;
use crate::time::interval::Interval;
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
// 1970-01-01 is a Thursday; weeks start on Monday.
const WEEK_EPOCH_OFFSET: i64 = 3 * SECONDS_PER_DAY;

/// Time-bucketing unit of a query, always in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per contiguous span.
    All,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::All => "all",
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }

    /// Index of the bucket containing `instant`, counted from a fixed origin.
    fn bucket_index(&self, instant: &DateTime<Utc>) -> i64 {
        let seconds = instant.timestamp();
        let year = i64::from(instant.year());
        let month0 = i64::from(instant.month0());
        match self {
            Granularity::All => 0,
            Granularity::Minute => seconds.div_euclid(60),
            Granularity::Hour => seconds.div_euclid(3_600),
            Granularity::Day => seconds.div_euclid(SECONDS_PER_DAY),
            Granularity::Week => (seconds + WEEK_EPOCH_OFFSET).div_euclid(SECONDS_PER_WEEK),
            Granularity::Month => year * 12 + month0,
            Granularity::Quarter => year * 4 + month0 / 3,
            Granularity::Year => year,
        }
    }

    /// Whether `instant` falls exactly on a bucket boundary.
    pub fn is_aligned(&self, instant: &DateTime<Utc>) -> bool {
        let seconds = instant.timestamp();
        let whole_second = instant.nanosecond() == 0;
        let midnight = whole_second && instant.num_seconds_from_midnight() == 0;
        match self {
            Granularity::All => true,
            Granularity::Minute => whole_second && seconds.rem_euclid(60) == 0,
            Granularity::Hour => whole_second && seconds.rem_euclid(3_600) == 0,
            Granularity::Day => midnight,
            Granularity::Week => {
                whole_second && (seconds + WEEK_EPOCH_OFFSET).rem_euclid(SECONDS_PER_WEEK) == 0
            }
            Granularity::Month => midnight && instant.day() == 1,
            Granularity::Quarter => midnight && instant.day() == 1 && instant.month0() % 3 == 0,
            Granularity::Year => midnight && instant.day() == 1 && instant.month() == 1,
        }
    }

    /// Indices of the grain buckets an interval touches, as a half-open
    /// range. Empty intervals touch none.
    ///
    /// Under `all` every non-empty interval is bucket `0`.
    pub fn bucket_range(&self, interval: &Interval) -> Range<i64> {
        if interval.is_empty() {
            return 0..0;
        }
        if *self == Granularity::All {
            return 0..1;
        }

        let first = self.bucket_index(interval.start());
        let mut end = self.bucket_index(interval.end());
        if !self.is_aligned(interval.end()) {
            end += 1;
        }
        first..end
    }

    /// Number of grain buckets an interval touches.
    pub fn bucket_count(&self, interval: &Interval) -> u64 {
        let range = self.bucket_range(interval);
        u64::try_from(range.end - range.start).unwrap_or(0)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Granularity::All),
            "minute" => Ok(Granularity::Minute),
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "quarter" => Ok(Granularity::Quarter),
            "year" => Ok(Granularity::Year),
            _ => Err(QueryError::InvalidGranularity(s.to_string())),
        }
    }
}
