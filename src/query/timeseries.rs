//! Timeseries queries.

use crate::model::{
    Aggregation, DataSource, DefaultQueryType, Dimension, Filter, PostAggregation, QueryContext,
    QueryTypeRef,
};
use crate::query::AggregationQuery;
use crate::time::{Granularity, Interval};
use indexmap::IndexSet;
use serde::Serialize;

/// A `timeseries` query: aggregate per time bucket only, no dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesQuery {
    query_type: QueryTypeRef,
    data_source: DataSource,
    granularity: Granularity,
    aggregations: IndexSet<Aggregation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_aggregations: Option<IndexSet<PostAggregation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    intervals: Vec<Interval>,
    context: QueryContext,
}

fact_query_common!(TimeseriesQuery);

impl TimeseriesQuery {
    pub fn builder(data_source: DataSource, granularity: Granularity) -> TimeseriesQueryBuilder {
        TimeseriesQueryBuilder {
            data_source,
            granularity,
            filter: None,
            aggregations: Vec::new(),
            post_aggregations: None,
            intervals: Vec::new(),
            context: None,
            do_fork: false,
        }
    }
}

impl AggregationQuery for TimeseriesQuery {
    fn dimensions(&self) -> &[Dimension] {
        &[]
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

#[derive(Debug, Clone)]
pub struct TimeseriesQueryBuilder {
    data_source: DataSource,
    granularity: Granularity,
    filter: Option<Filter>,
    aggregations: Vec<Aggregation>,
    post_aggregations: Option<Vec<PostAggregation>>,
    intervals: Vec<Interval>,
    context: Option<QueryContext>,
    do_fork: bool,
}

impl TimeseriesQueryBuilder {
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

    pub fn build(self) -> TimeseriesQuery {
        let context = match self.context {
            Some(context) => context.derive(self.do_fork),
            None => QueryContext::new(),
        };

        TimeseriesQuery {
            query_type: DefaultQueryType::Timeseries.into(),
            data_source: self.data_source,
            granularity: self.granularity,
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
