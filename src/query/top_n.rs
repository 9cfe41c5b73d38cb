//! Top-N queries.

use crate::model::{
    Aggregation, DataSource, DefaultQueryType, Dimension, Filter, PostAggregation, QueryContext,
    QueryTypeRef,
};
use crate::query::{AggregationQuery, QueryError, QueryResult, WeightStep};
use crate::time::{Granularity, Interval};
use indexmap::IndexSet;
use serde::Serialize;

/// A `topN` query: the `threshold` best values of one dimension, ranked by a
/// metric, per time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopNQuery {
    query_type: QueryTypeRef,
    data_source: DataSource,
    granularity: Granularity,
    dimension: Dimension,
    metric: String,
    threshold: u64,
    aggregations: IndexSet<Aggregation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_aggregations: Option<IndexSet<PostAggregation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    intervals: Vec<Interval>,
    context: QueryContext,
}

fact_query_common!(TopNQuery);

impl TopNQuery {
    pub fn builder(
        data_source: DataSource,
        granularity: Granularity,
        dimension: Dimension,
        metric: impl Into<String>,
        threshold: u64,
    ) -> TopNQueryBuilder {
        TopNQueryBuilder {
            data_source,
            granularity,
            dimension,
            metric: metric.into(),
            threshold,
            filter: None,
            aggregations: Vec::new(),
            post_aggregations: None,
            intervals: Vec::new(),
            context: None,
            do_fork: false,
        }
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn with_threshold(&self, threshold: u64) -> Self {
        Self {
            threshold,
            ..self.clone()
        }
    }
}

impl AggregationQuery for TopNQuery {
    fn dimensions(&self) -> &[Dimension] {
        std::slice::from_ref(&self.dimension)
    }

    fn aggregations(&self) -> IndexSet<Aggregation> {
        self.aggregations.clone()
    }

    fn post_aggregations(&self) -> IndexSet<PostAggregation> {
        self.post_aggregations.clone().unwrap_or_default()
    }

    fn with_aggregations<I>(&self, aggregations: I) -> Self
    where
        I: IntoIterator<Item = Aggregation>,
    {
        Self {
            aggregations: aggregations.into_iter().collect(),
            ..self.clone()
        }
    }

    fn with_post_aggregations<I>(&self, post_aggregations: I) -> Self
    where
        I: IntoIterator<Item = PostAggregation>,
    {
        Self {
            post_aggregations: Some(post_aggregations.into_iter().collect()),
            ..self.clone()
        }
    }

    /// At most `threshold` rows survive per bucket, so the threshold caps the
    /// dimension's cardinality; with unknown cardinality the threshold is
    /// used as is.
    fn cardinality_weight(&self) -> QueryResult<i64> {
        let threshold = i64::try_from(self.threshold).map_err(|_| QueryError::WeightOverflow {
            step: WeightStep::Cardinality,
        })?;
        Ok(if self.dimension.has_known_cardinality() {
            self.dimension.cardinality().min(threshold)
        } else {
            threshold
        })
    }
}

#[derive(Debug, Clone)]
pub struct TopNQueryBuilder {
    data_source: DataSource,
    granularity: Granularity,
    dimension: Dimension,
    metric: String,
    threshold: u64,
    filter: Option<Filter>,
    aggregations: Vec<Aggregation>,
    post_aggregations: Option<Vec<PostAggregation>>,
    intervals: Vec<Interval>,
    context: Option<QueryContext>,
    do_fork: bool,
}

impl TopNQueryBuilder {
    pub fn filter(mut self, filter: impl Into<Option<Filter>>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn aggregations(mut self, aggregations: impl IntoIterator<Item = Aggregation>) -> Self {
        self.aggregations = aggregations.into_iter().collect();
        self
    }

    pub fn post_aggregations(
        mut self,
        post_aggregations: impl IntoIterator<Item = PostAggregation>,
    ) -> Self {
        self.post_aggregations = Some(post_aggregations.into_iter().collect());
        self
    }

    pub fn intervals(mut self, intervals: impl IntoIterator<Item = Interval>) -> Self {
        self.intervals = intervals.into_iter().collect();
        self
    }

    pub fn context(mut self, context: QueryContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn fork(mut self, do_fork: bool) -> Self {
        self.do_fork = do_fork;
        self
    }

    pub fn build(self) -> TopNQuery {
        let context = match self.context {
            Some(context) => context.derive(self.do_fork),
            None => QueryContext::new(),
        };

        TopNQuery {
            query_type: DefaultQueryType::TopN.into(),
            data_source: self.data_source,
            granularity: self.granularity,
            dimension: self.dimension,
            metric: self.metric,
            threshold: self.threshold,
            aggregations: self.aggregations.into_iter().collect(),
            post_aggregations: self
                .post_aggregations
                .map(|post_aggregations| post_aggregations.into_iter().collect()),
            filter: self.filter,
            intervals: self.intervals,
            context,
        }
    }
}
