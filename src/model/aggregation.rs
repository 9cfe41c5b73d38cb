//! Aggregation specs.
//!
//! The query model only consumes three capabilities from an aggregation: the
//! field it reads, the dimensions its filter depends on, and whether it builds
//! a cardinality-estimating sketch.

use crate::model::dimension::Dimension;
use crate::model::filter::Filter;
use indexmap::IndexSet;
use serde::Serialize;

/// Default size for theta sketches when the caller does not pick one.
pub const DEFAULT_SKETCH_SIZE: u32 = 16_384;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Aggregation {
    Count {
        name: String,
    },
    LongSum {
        name: String,
        field_name: String,
    },
    DoubleSum {
        name: String,
        field_name: String,
    },
    /// Approximate distinct count.
    ThetaSketch {
        name: String,
        field_name: String,
        size: u32,
    },
    /// Applies a dimension filter before aggregating.
    Filtered {
        filter: Filter,
        aggregator: Box<Aggregation>,
    },
}

impl Aggregation {
    pub fn count(name: impl Into<String>) -> Self {
        Aggregation::Count { name: name.into() }
    }

    pub fn long_sum(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Aggregation::LongSum {
            name: name.into(),
            field_name: field_name.into(),
        }
    }

    pub fn double_sum(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Aggregation::DoubleSum {
            name: name.into(),
            field_name: field_name.into(),
        }
    }

    pub fn theta_sketch(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Aggregation::ThetaSketch {
            name: name.into(),
            field_name: field_name.into(),
            size: DEFAULT_SKETCH_SIZE,
        }
    }

    pub fn filtered(filter: Filter, aggregator: Aggregation) -> Self {
        Aggregation::Filtered {
            filter,
            aggregator: Box::new(aggregator),
        }
    }

    /// Output name of the aggregation.
    pub fn name(&self) -> &str {
        match self {
            Aggregation::Count { name }
            | Aggregation::LongSum { name, .. }
            | Aggregation::DoubleSum { name, .. }
            | Aggregation::ThetaSketch { name, .. } => name,
            Aggregation::Filtered { aggregator, .. } => aggregator.name(),
        }
    }

    /// Backend column read by the aggregation; empty for `count`.
    pub fn field_name(&self) -> &str {
        match self {
            Aggregation::Count { .. } => "",
            Aggregation::LongSum { field_name, .. }
            | Aggregation::DoubleSum { field_name, .. }
            | Aggregation::ThetaSketch { field_name, .. } => field_name,
            Aggregation::Filtered { aggregator, .. } => aggregator.field_name(),
        }
    }

    /// Dimensions referenced by filters inside this aggregation.
    pub fn dependent_dimensions(&self) -> IndexSet<Dimension> {
        match self {
            Aggregation::Filtered { filter, aggregator } => {
                let mut dims = filter.dimensions();
                dims.extend(aggregator.dependent_dimensions());
                dims
            }
            _ => IndexSet::new(),
        }
    }

    /// Whether this aggregation builds a cardinality-estimating sketch.
    ///
    /// A filtered sketch is still a sketch.
    pub fn is_sketch(&self) -> bool {
        match self {
            Aggregation::ThetaSketch { .. } => true,
            Aggregation::Filtered { aggregator, .. } => aggregator.is_sketch(),
            _ => false,
        }
    }

    /// Copy of this aggregation with any sketch resized to `size`.
    pub fn with_sketch_size(&self, size: u32) -> Self {
        match self {
            Aggregation::ThetaSketch {
                name, field_name, ..
            } => Aggregation::ThetaSketch {
                name: name.clone(),
                field_name: field_name.clone(),
                size,
            },
            Aggregation::Filtered { filter, aggregator } => Aggregation::Filtered {
                filter: filter.clone(),
                aggregator: Box::new(aggregator.with_sketch_size(size)),
            },
            other => other.clone(),
        }
    }
}
