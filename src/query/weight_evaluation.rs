//! Weight-evaluation queries.
//!
//! When the static weight of a query is too high, a cheaper query is sent
//! first to measure how many rows the real one would produce. The inner query
//! keeps the measured query's dimensions, filter, granularity and intervals, but
//! only builds small sketches plus a row count; the outer query sums those
//! counts into a single number.

use crate::model::{Aggregation, DataSource};
use crate::query::{AggregationQuery, FactQuery, GroupByQuery, QueryResult};
use crate::time::Granularity;
use tracing::debug;

/// Name of the row-count aggregation in both the inner and outer query.
pub const WEIGHT_COUNT_FIELD: &str = "count";

/// Build the weight-evaluation query for `query`.
///
/// Sketches in the innermost query are resized to `sketch_size`; every other
/// aggregation and all post-aggregations are dropped. Both levels run in
/// forked contexts so they can be told apart from the measured request.
pub fn weight_evaluation_query(
    query: &dyn AggregationQuery,
    sketch_size: u32,
) -> QueryResult<GroupByQuery> {
    let innermost = query.innermost_query()?;

    let aggregations = innermost
        .aggregations()
        .iter()
        .filter(|aggregation| aggregation.is_sketch())
        .map(|aggregation| aggregation.with_sketch_size(sketch_size))
        .chain(std::iter::once(Aggregation::count(WEIGHT_COUNT_FIELD)))
        .collect::<Vec<_>>();

    let inner = GroupByQuery::builder(innermost.data_source().clone(), innermost.granularity())
        .dimensions(innermost.dimensions().iter().cloned())
        .filter(innermost.filter().cloned())
        .aggregations(aggregations)
        .intervals(innermost.intervals().iter().copied())
        .context(innermost.context().clone())
        .fork(true)
        .build();

    let outer = GroupByQuery::builder(DataSource::query(inner), Granularity::All)
        .dimensions([])
        .aggregations([Aggregation::long_sum(WEIGHT_COUNT_FIELD, WEIGHT_COUNT_FIELD)])
        .intervals(query.intervals().iter().copied())
        .context(query.context().clone())
        .fork(true)
        .build();

    debug!(
        query_id = %outer.context().query_id(),
        parent_query_id = %query.context().query_id(),
        data_sources = ?innermost.data_source().names(),
        "built weight evaluation query"
    );
    Ok(outer)
}
