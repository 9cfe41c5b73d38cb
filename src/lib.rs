//! # druid-query
//!
//! Typed, immutable Druid aggregation queries with a backend-agnostic weight
//! estimate used for admission control.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                Model (building blocks)                  │
//! │  (query types, dimensions, filters, aggregations,       │
//! │   post-aggregations, data sources, context)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [builders / with_*]
//! ┌─────────────────────────────────────────────────────────┐
//! │            Aggregation queries (immutable)              │
//! │        groupBy · topN · timeseries, nestable            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [weight + interval slicer]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Weight = cardinality × sketches × periods (checked)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [admission]
//! ┌─────────────────────────────────────────────────────────┐
//! │    Accept, or run a weight-evaluation query first       │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod model;
pub mod query;
pub mod time;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{Settings, WeightSettings};
    pub use crate::model::{
        Aggregation, ArithmeticOp, DataSource, DefaultQueryType, Dimension, Filter,
        NamedQueryType, PostAggregation, QueryContext, QueryType, QueryTypeRef,
    };
    pub use crate::query::{
        check_weight, AggregationQuery, FactQuery, GroupByQuery, QueryError, QueryResult,
        QueryWeight, TimeseriesQuery, TopNQuery, WeightDecision,
    };
    pub use crate::time::{GrainSlicer, Granularity, Interval, IntervalSlicer};
}

pub use query::{AggregationQuery, FactQuery, QueryError, QueryResult, QueryWeight};
