//! Aggregation query model.
//!
//! Queries are immutable once built. Every `with_*` operation returns a new
//! query and leaves the receiver untouched, so a query can be shared across
//! threads and evaluated concurrently without locking.
//!
//! Two traits describe the capability surface:
//! - [`FactQuery`]: type, data source, granularity, filter, intervals, context
//! - [`AggregationQuery`]: dimensions, aggregations, post-aggregations, the
//!   derived views, nested-query navigation, and the overridable weight steps
//!
//! The weight skeleton itself lives in [`weight::QueryWeight`] and cannot be
//! overridden; query kinds only customize its steps.

use crate::model::{
    Aggregation, DataSource, Dimension, Filter, PostAggregation, QueryContext, QueryTypeRef,
    DEFAULT_SKETCH_SIZE,
};
use crate::time::{Granularity, Interval, IntervalSlicer};
use indexmap::IndexSet;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Generates the [`FactQuery`] impl and the shared `with_*` copies for a
/// query struct with the standard fact fields.
macro_rules! fact_query_common {
    ($ty:ty) => {
        impl $crate::query::FactQuery for $ty {
            fn query_type(&self) -> &$crate::model::QueryTypeRef {
                &self.query_type
            }

            fn data_source(&self) -> &$crate::model::DataSource {
                &self.data_source
            }

            fn granularity(&self) -> $crate::time::Granularity {
                self.granularity
            }

            fn filter(&self) -> Option<&$crate::model::Filter> {
                self.filter.as_ref()
            }

            fn intervals(&self) -> &[$crate::time::Interval] {
                &self.intervals
            }

            fn context(&self) -> &$crate::model::QueryContext {
                &self.context
            }
        }

        impl $ty {
            pub fn with_data_source(&self, data_source: $crate::model::DataSource) -> Self {
                Self {
                    data_source,
                    ..self.clone()
                }
            }

            pub fn with_granularity(&self, granularity: $crate::time::Granularity) -> Self {
                Self {
                    granularity,
                    ..self.clone()
                }
            }

            pub fn with_filter(&self, filter: Option<$crate::model::Filter>) -> Self {
                Self {
                    filter,
                    ..self.clone()
                }
            }

            pub fn with_intervals(
                &self,
                intervals: impl IntoIterator<Item = $crate::time::Interval>,
            ) -> Self {
                Self {
                    intervals: intervals.into_iter().collect(),
                    ..self.clone()
                }
            }

            /// Copy with `context` used verbatim.
            pub fn with_context(&self, context: $crate::model::QueryContext) -> Self {
                Self {
                    context,
                    ..self.clone()
                }
            }

            /// Copy running in a new nested context scope.
            pub fn forked(&self) -> Self {
                self.with_context(self.context.fork())
            }

            /// Compact JSON body as posted to the broker.
            pub fn to_json(&self) -> serde_json::Result<String> {
                serde_json::to_string(self)
            }
        }
    };
}

pub mod admission;
pub mod group_by;
pub mod timeseries;
pub mod top_n;
pub mod weight;
pub mod weight_evaluation;

pub use admission::{check_weight, WeightDecision};
pub use group_by::{GroupByQuery, GroupByQueryBuilder};
pub use timeseries::{TimeseriesQuery, TimeseriesQueryBuilder};
pub use top_n::{TopNQuery, TopNQueryBuilder};
pub use weight::{QueryWeight, WeightStep};
pub use weight_evaluation::{weight_evaluation_query, WEIGHT_COUNT_FIELD};

/// Default bound on inner-query hops when resolving the innermost query.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 100;

/// Errors raised by the query model and weight estimation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Query weight overflowed in the {step} step")]
    WeightOverflow { step: WeightStep },

    #[error("Cycle detected in nested queries after {depth} hops")]
    CycleDetected { depth: usize },

    #[error("Query nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("Query has no aggregations")]
    MissingAggregations,

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid granularity: {0}")]
    InvalidGranularity(String),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// A query against fact rows over time.
pub trait FactQuery: fmt::Debug + Send + Sync {
    fn query_type(&self) -> &QueryTypeRef;

    fn data_source(&self) -> &DataSource;

    fn granularity(&self) -> Granularity;

    fn filter(&self) -> Option<&Filter>;

    fn intervals(&self) -> &[Interval];

    fn context(&self) -> &QueryContext;
}

/// Upcast to a trait object; implemented for every sized aggregation query.
pub trait AsAggregationQuery {
    fn as_aggregation_query(&self) -> &dyn AggregationQuery;
}

impl<T: AggregationQuery> AsAggregationQuery for T {
    fn as_aggregation_query(&self) -> &dyn AggregationQuery {
        self
    }
}

pub trait AggregationQuery: FactQuery + AsAggregationQuery {
    /// Dimensions in caller-supplied order, without duplicates.
    fn dimensions(&self) -> &[Dimension];

    /// A fresh copy of the aggregations on every call.
    fn aggregations(&self) -> IndexSet<Aggregation>;

    /// A fresh copy of the post-aggregations on every call.
    fn post_aggregations(&self) -> IndexSet<PostAggregation>;

    fn with_aggregations<I>(&self, aggregations: I) -> Self
    where
        I: IntoIterator<Item = Aggregation>,
        Self: Sized;

    fn with_post_aggregations<I>(&self, post_aggregations: I) -> Self
    where
        I: IntoIterator<Item = PostAggregation>,
        Self: Sized;

    /// The immediately wrapped query, if any.
    fn inner_query(&self) -> Option<&dyn AggregationQuery> {
        self.data_source()
            .inner_query()
            .map(|query| query as &dyn AggregationQuery)
    }

    /// The immediately wrapped query, or this query when nothing is wrapped.
    fn inner_query_or_self(&self) -> &dyn AggregationQuery {
        match self.inner_query() {
            Some(inner) => inner,
            None => self.as_aggregation_query(),
        }
    }

    /// The end of the inner-query chain.
    fn innermost_query(&self) -> QueryResult<&dyn AggregationQuery> {
        innermost_query(self.as_aggregation_query(), DEFAULT_MAX_NESTING_DEPTH)
    }

    /// Non-empty field names read by the innermost query's aggregations.
    fn dependent_field_names(&self) -> QueryResult<BTreeSet<String>> {
        let aggregations = self.innermost_query()?.aggregations();
        if aggregations.is_empty() {
            return Err(QueryError::MissingAggregations);
        }
        Ok(aggregations
            .iter()
            .map(Aggregation::field_name)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Dimensions referenced inside filtered aggregations of the innermost
    /// query.
    fn metric_dimensions(&self) -> QueryResult<IndexSet<Dimension>> {
        Ok(self
            .innermost_query()?
            .aggregations()
            .iter()
            .flat_map(Aggregation::dependent_dimensions)
            .collect())
    }

    /// Weight contributed by sketch aggregations: how many there are.
    fn sketch_weight(&self) -> QueryResult<i64> {
        let sketches = self
            .aggregations()
            .iter()
            .filter(|aggregation| aggregation.is_sketch())
            .count();
        i64::try_from(sketches).map_err(|_| QueryError::WeightOverflow {
            step: WeightStep::Sketch,
        })
    }

    /// Weight contributed by the time range: grain slices after simplifying.
    fn period_weight(&self, slicer: &dyn IntervalSlicer) -> QueryResult<i64> {
        let slices = slicer.count_sliced_intervals(self.intervals(), self.granularity())?;
        i64::try_from(slices).map_err(|_| QueryError::WeightOverflow {
            step: WeightStep::Period,
        })
    }

    /// Weight contributed by dimensions: product of known cardinalities.
    fn cardinality_weight(&self) -> QueryResult<i64> {
        self.dimensions()
            .iter()
            .filter(|dimension| dimension.has_known_cardinality())
            .try_fold(1i64, |product, dimension| {
                product.checked_mul(dimension.cardinality())
            })
            .ok_or(QueryError::WeightOverflow {
                step: WeightStep::Cardinality,
            })
    }

    /// A cheap query whose result measures this query's real weight.
    fn build_weight_evaluation_query(&self) -> QueryResult<GroupByQuery> {
        weight_evaluation_query(self.as_aggregation_query(), DEFAULT_SKETCH_SIZE)
    }
}

/// Follow inner queries to the end of the chain.
///
/// Walks iteratively, failing with [`QueryError::CycleDetected`] when a query
/// is revisited and with [`QueryError::NestingTooDeep`] after `max_depth`
/// hops.
pub fn innermost_query(
    query: &dyn AggregationQuery,
    max_depth: usize,
) -> QueryResult<&dyn AggregationQuery> {
    let mut seen: HashSet<*const ()> = HashSet::new();
    seen.insert(address(query));

    let mut current = query;
    let mut depth = 0;
    while let Some(inner) = current.inner_query() {
        depth += 1;
        if !seen.insert(address(inner)) {
            return Err(QueryError::CycleDetected { depth });
        }
        if depth > max_depth {
            return Err(QueryError::NestingTooDeep { limit: max_depth });
        }
        trace!(depth, query_type = %inner.query_type(), "descending into inner query");
        current = inner;
    }
    Ok(current)
}

fn address(query: &dyn AggregationQuery) -> *const () {
    query as *const dyn AggregationQuery as *const ()
}

/// Collect into a duplicate-free vector, keeping first occurrences in order.
fn distinct<T, I>(items: I) -> Vec<T>
where
    T: std::hash::Hash + Eq,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .collect::<IndexSet<T>>()
        .into_iter()
        .collect()
}
