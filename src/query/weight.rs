//! Worst-case weight estimation.
//!
//! The weight is a rough, relative measure of how much work the backend will
//! do for a query:
//!
//! ```text
//! weight = cardinality * (sketches * periods)
//! ```
//!
//! Only sketch aggregations are assumed to scale with cardinality, so a query
//! without sketches weighs zero and the other steps are skipped. Every
//! multiplication is overflow-checked; a wrapped value would let an expensive
//! query pass as cheap.
//!
//! Query kinds customize the steps through [`AggregationQuery`]; the
//! combination here is shared by all of them.

use crate::query::{AggregationQuery, QueryError, QueryResult};
use crate::time::IntervalSlicer;
use std::fmt;
use tracing::debug;

/// Step of the weight computation, reported on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightStep {
    Sketch,
    Period,
    Cardinality,
    Combine,
}

impl fmt::Display for WeightStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeightStep::Sketch => "sketch",
            WeightStep::Period => "period",
            WeightStep::Cardinality => "cardinality",
            WeightStep::Combine => "combine",
        })
    }
}

/// Weight computation, available on every aggregation query.
pub trait QueryWeight {
    /// Worst-case weight of the query.
    ///
    /// Fails with [`QueryError::MissingAggregations`] when the query has no
    /// aggregations at all, and with [`QueryError::WeightOverflow`] when the
    /// estimate does not fit in an `i64`.
    fn compute_weight(&self, slicer: &dyn IntervalSlicer) -> QueryResult<i64>;
}

impl<Q: AggregationQuery + ?Sized> QueryWeight for Q {
    fn compute_weight(&self, slicer: &dyn IntervalSlicer) -> QueryResult<i64> {
        if self.aggregations().is_empty() {
            return Err(QueryError::MissingAggregations);
        }

        let sketch_weight = self.sketch_weight()?;
        if sketch_weight == 0 {
            return Ok(0);
        }

        let period_weight = self.period_weight(slicer)?;
        let cardinality_weight = self.cardinality_weight()?;

        let weight = sketch_weight
            .checked_mul(period_weight)
            .and_then(|partial| cardinality_weight.checked_mul(partial))
            .ok_or(QueryError::WeightOverflow {
                step: WeightStep::Combine,
            })?;

        debug!(
            weight,
            sketch_weight, period_weight, cardinality_weight, "worst case weight"
        );
        Ok(weight)
    }
}
