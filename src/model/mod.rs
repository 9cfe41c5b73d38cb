//! Building blocks of a Druid query.

pub mod aggregation;
pub mod context;
pub mod datasource;
pub mod dimension;
pub mod filter;
pub mod post_aggregation;
pub mod query_type;

pub use aggregation::{Aggregation, DEFAULT_SKETCH_SIZE};
pub use context::QueryContext;
pub use datasource::DataSource;
pub use dimension::Dimension;
pub use filter::Filter;
pub use post_aggregation::{ArithmeticOp, PostAggregation};
pub use query_type::{wire_name_for, DefaultQueryType, NamedQueryType, QueryType, QueryTypeRef};
