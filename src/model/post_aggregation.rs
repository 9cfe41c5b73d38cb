// src/model/post_aggregation.rs
use serde::Serialize;

/// Arithmetic operator of an arithmetic post-aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArithmeticOp {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "quotient")]
    Quotient,
}

/// A computation over aggregation results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PostAggregation {
    FieldAccess {
        name: String,
        field_name: String,
    },
    Arithmetic {
        name: String,
        #[serde(rename = "fn")]
        op: ArithmeticOp,
        fields: Vec<PostAggregation>,
    },
    ThetaSketchEstimate {
        name: String,
        field: Box<PostAggregation>,
    },
}

impl PostAggregation {
    pub fn field_access(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        PostAggregation::FieldAccess {
            name: name.into(),
            field_name: field_name.into(),
        }
    }

    pub fn arithmetic(
        name: impl Into<String>,
        op: ArithmeticOp,
        fields: impl IntoIterator<Item = PostAggregation>,
    ) -> Self {
        PostAggregation::Arithmetic {
            name: name.into(),
            op,
            fields: fields.into_iter().collect(),
        }
    }

    pub fn sketch_estimate(name: impl Into<String>, field: PostAggregation) -> Self {
        PostAggregation::ThetaSketchEstimate {
            name: name.into(),
            field: Box::new(field),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PostAggregation::FieldAccess { name, .. }
            | PostAggregation::Arithmetic { name, .. }
            | PostAggregation::ThetaSketchEstimate { name, .. } => name,
        }
    }
}
