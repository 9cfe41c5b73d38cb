//! Interval slicing.
//!
//! The weight estimator only needs to know how many grain-aligned slices a
//! set of intervals produces. [`IntervalSlicer`] is that capability;
//! [`GrainSlicer`] is the calendar-arithmetic implementation used by default.

use crate::query::{QueryError, QueryResult, WeightStep};
use crate::time::granularity::Granularity;
use crate::time::interval::Interval;

pub trait IntervalSlicer: Send + Sync {
    /// Simplify `intervals` and count the grain buckets they cover.
    fn count_sliced_intervals(
        &self,
        intervals: &[Interval],
        granularity: Granularity,
    ) -> QueryResult<u64>;
}

/// Counts buckets with calendar arithmetic, without materializing them.
///
/// Disjoint intervals that land in the same grain bucket count it once.
/// Under `all` each simplified span is its own slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrainSlicer;

impl IntervalSlicer for GrainSlicer {
    fn count_sliced_intervals(
        &self,
        intervals: &[Interval],
        granularity: Granularity,
    ) -> QueryResult<u64> {
        let overflow = || QueryError::WeightOverflow {
            step: WeightStep::Period,
        };
        let simplified = simplify(intervals);

        if granularity == Granularity::All {
            return simplified
                .iter()
                .map(|interval| granularity.bucket_count(interval))
                .try_fold(0u64, |total, count| total.checked_add(count))
                .ok_or_else(overflow);
        }

        // Simplified intervals are sorted and disjoint, so bucket ranges only
        // ever overlap the previous one.
        let mut total = 0u64;
        let mut counted_until: Option<i64> = None;
        for interval in &simplified {
            let range = granularity.bucket_range(interval);
            let start = counted_until.map_or(range.start, |end| range.start.max(end));
            if range.end > start {
                let fresh = u64::try_from(range.end - start).map_err(|_| overflow())?;
                total = total.checked_add(fresh).ok_or_else(overflow)?;
                counted_until = Some(range.end);
            }
        }
        Ok(total)
    }
}

/// Sort intervals and merge the ones that overlap or abut.
///
/// Empty intervals are dropped.
pub fn simplify(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals
        .iter()
        .filter(|interval| !interval.is_empty())
        .copied()
        .collect();
    sorted.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if last.touches(&interval) => {
                if interval.end() > last.end() {
                    // Both endpoints already validated, so this cannot fail.
                    if let Ok(joined) = Interval::new(*last.start(), *interval.end()) {
                        *last = joined;
                    }
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}
