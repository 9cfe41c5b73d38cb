//! Dimension filters.
//!
//! Only the shapes needed to describe filtered aggregations and query-level
//! filters are modelled here.

use crate::model::dimension::Dimension;
use indexmap::IndexSet;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Filter {
    Selector {
        dimension: Dimension,
        value: String,
    },
    In {
        dimension: Dimension,
        values: Vec<String>,
    },
    And {
        fields: Vec<Filter>,
    },
    Or {
        fields: Vec<Filter>,
    },
    Not {
        field: Box<Filter>,
    },
}

impl Filter {
    pub fn selector(dimension: Dimension, value: impl Into<String>) -> Self {
        Filter::Selector {
            dimension,
            value: value.into(),
        }
    }

    pub fn in_values<I, S>(dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::In {
            dimension,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(fields: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn or(fields: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn negate(field: Filter) -> Self {
        Filter::Not {
            field: Box::new(field),
        }
    }

    /// Dimensions referenced anywhere in this filter, in first-seen order.
    pub fn dimensions(&self) -> IndexSet<Dimension> {
        let mut out = IndexSet::new();
        self.collect_dimensions(&mut out);
        out
    }

    fn collect_dimensions(&self, out: &mut IndexSet<Dimension>) {
        match self {
            Filter::Selector { dimension, .. } | Filter::In { dimension, .. } => {
                out.insert(dimension.clone());
            }
            Filter::And { fields } | Filter::Or { fields } => {
                for field in fields {
                    field.collect_dimensions(out);
                }
            }
            Filter::Not { field } => field.collect_dimensions(out),
        }
    }
}
