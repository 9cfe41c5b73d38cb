//! Group-by queries.

use crate::model::{
    Aggregation, DataSource, DefaultQueryType, Dimension, Filter, PostAggregation, QueryContext,
    QueryTypeRef,
};
use crate::query::{distinct, AggregationQuery};
use crate::time::{Granularity, Interval};
use indexmap::IndexSet;
use serde::Serialize;

/// A `groupBy` query: aggregate per combination of dimension values and
/// time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupByQuery {
    query_type: QueryTypeRef,
    data_source: DataSource,
    granularity: Granularity,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<Vec<Dimension>>,
    aggregations: IndexSet<Aggregation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_aggregations: Option<IndexSet<PostAggregation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    intervals: Vec<Interval>,
    context: QueryContext,
}

fact_query_common!(GroupByQuery);

impl GroupByQuery {
    pub fn builder(data_source: DataSource, granularity: Granularity) -> GroupByQueryBuilder {
        GroupByQueryBuilder::new(data_source, granularity)
    }

    /// Copy with new dimensions, de-duplicated in the given order.
    pub fn with_dimensions(&self, dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        Self {
            dimensions: Some(distinct(dimensions)),
            ..self.clone()
        }
    }

    /// Wrap this query as the data source of a new outer query.
    ///
    /// The outer query starts with the same granularity, intervals and a
    /// forked context, and no dimensions or aggregations.
    pub fn wrap(self) -> GroupByQueryBuilder {
        let granularity = self.granularity;
        let intervals = self.intervals.clone();
        let context = self.context.clone();
        GroupByQueryBuilder::new(DataSource::query(self), granularity)
            .intervals(intervals)
            .context(context)
            .fork(true)
    }
}

impl AggregationQuery for GroupByQuery {
    fn dimensions(&self) -> &[Dimension] {
        self.dimensions.as_deref().unwrap_or(&[])
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
}

/// Assembles a [`GroupByQuery`].
///
/// Unset collections stay unset: `dimensions` and `post_aggregations` are
/// then omitted from the wire form, and aggregations default to empty.
#[derive(Debug, Clone)]
pub struct GroupByQueryBuilder {
    query_type: QueryTypeRef,
    data_source: DataSource,
    granularity: Granularity,
    dimensions: Option<Vec<Dimension>>,
    filter: Option<Filter>,
    aggregations: Vec<Aggregation>,
    post_aggregations: Option<Vec<PostAggregation>>,
    intervals: Vec<Interval>,
    context: Option<QueryContext>,
    do_fork: bool,
}

impl GroupByQueryBuilder {
    pub fn new(data_source: DataSource, granularity: Granularity) -> Self {
        Self {
            query_type: DefaultQueryType::GroupBy.into(),
            data_source,
            granularity,
            dimensions: None,
            filter: None,
            aggregations: Vec::new(),
            post_aggregations: None,
            intervals: Vec::new(),
            context: None,
            do_fork: false,
        }
    }

    /// Override the query kind, for backend extensions that share the
    /// group-by shape.
    pub fn query_type(mut self, query_type: impl Into<QueryTypeRef>) -> Self {
        self.query_type = query_type.into();
        self
    }

    pub fn dimensions(mut self, dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        self.dimensions = Some(dimensions.into_iter().collect());
        self
    }

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

    /// Fork the supplied context into a new nested scope instead of
    /// copying it.
    pub fn fork(mut self, do_fork: bool) -> Self {
        self.do_fork = do_fork;
        self
    }

    pub fn build(self) -> GroupByQuery {
        let context = match self.context {
            Some(context) => context.derive(self.do_fork),
            None => QueryContext::new(),
        };

        GroupByQuery {
            query_type: self.query_type,
            data_source: self.data_source,
            granularity: self.granularity,
            dimensions: self.dimensions.map(distinct),
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
