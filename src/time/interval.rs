// src/time/interval.rs
use crate::query::{QueryError, QueryResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Half-open UTC time range `[start, end)`.
///
/// Serializes as an ISO-8601 `start/end` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> QueryResult<Self> {
        if end < start {
            return Err(QueryError::InvalidInterval(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &DateTime<Utc> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Utc> {
        &self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two intervals overlap or share an endpoint.
    pub fn touches(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

impl FromStr for Interval {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| QueryError::InvalidInterval(format!("missing '/' in {:?}", s)))?;
        let parse = |part: &str| {
            DateTime::parse_from_rfc3339(part.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| QueryError::InvalidInterval(format!("{:?}: {}", part, e)))
        };
        Interval::new(parse(start)?, parse(end)?)
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
