//! Weight-based admission control.
//!
//! Cheap queries go straight to the backend. Anything heavier than the
//! configured threshold, or too heavy to weigh at all, is first measured with
//! a weight-evaluation query.

use crate::config::WeightSettings;
use crate::query::weight_evaluation::weight_evaluation_query;
use crate::query::{AggregationQuery, GroupByQuery, QueryError, QueryResult, QueryWeight};
use crate::time::IntervalSlicer;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum WeightDecision {
    /// Weight at or below the threshold.
    Accept { weight: i64 },
    /// Run `evaluation_query` first. `weight` is `None` when the estimate
    /// overflowed.
    Evaluate {
        weight: Option<i64>,
        evaluation_query: GroupByQuery,
    },
}

impl WeightDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, WeightDecision::Accept { .. })
    }
}

/// Decide whether `query` can run directly.
///
/// Overflow is treated as maximally expensive; every other error is passed
/// through.
pub fn check_weight(
    query: &dyn AggregationQuery,
    settings: &WeightSettings,
    slicer: &dyn IntervalSlicer,
) -> QueryResult<WeightDecision> {
    let weight = match query.compute_weight(slicer) {
        Ok(weight) if weight <= settings.weight_check_threshold => {
            debug!(weight, "query accepted without weight evaluation");
            return Ok(WeightDecision::Accept { weight });
        }
        Ok(weight) => Some(weight),
        Err(QueryError::WeightOverflow { step }) => {
            warn!(%step, "query weight overflowed, treating as maximally expensive");
            None
        }
        Err(err) => return Err(err),
    };

    let evaluation_query = weight_evaluation_query(query, settings.evaluation_sketch_size)?;
    Ok(WeightDecision::Evaluate {
        weight,
        evaluation_query,
    })
}
