//! Query type taxonomy.
//!
//! The built-in Druid query kinds live in [`DefaultQueryType`]. Applications
//! can introduce their own kinds by implementing [`QueryType`] (or by using
//! [`NamedQueryType`]); serialization only ever goes through
//! [`QueryType::wire_name`], so new kinds never require touching this module.

use inflector::Inflector;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A backend query kind that knows its canonical wire name.
pub trait QueryType: fmt::Debug + Send + Sync {
    /// Canonical wire name, e.g. `groupBy`.
    fn wire_name(&self) -> &str;
}

/// Derive a wire name from a declared SCREAMING_SNAKE tag.
///
/// `GROUP_BY` becomes `groupBy`, `TOP_N` becomes `topN`.
pub fn wire_name_for(tag: &str) -> String {
    tag.to_lowercase().to_camel_case()
}

/// Query kinds supported out of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultQueryType {
    GroupBy,
    TopN,
    Timeseries,
    TimeBoundary,
    SegmentMetadata,
    Search,
    Lookback,
}

// Indexed by discriminant; must stay in declaration order.
static DEFAULT_WIRE_NAMES: Lazy<[String; 7]> =
    Lazy::new(|| DefaultQueryType::ALL.map(|query_type| wire_name_for(query_type.tag())));

impl DefaultQueryType {
    pub const ALL: [DefaultQueryType; 7] = [
        DefaultQueryType::GroupBy,
        DefaultQueryType::TopN,
        DefaultQueryType::Timeseries,
        DefaultQueryType::TimeBoundary,
        DefaultQueryType::SegmentMetadata,
        DefaultQueryType::Search,
        DefaultQueryType::Lookback,
    ];

    /// The declared tag name.
    pub const fn tag(&self) -> &'static str {
        match self {
            DefaultQueryType::GroupBy => "GROUP_BY",
            DefaultQueryType::TopN => "TOP_N",
            DefaultQueryType::Timeseries => "TIMESERIES",
            DefaultQueryType::TimeBoundary => "TIME_BOUNDARY",
            DefaultQueryType::SegmentMetadata => "SEGMENT_METADATA",
            DefaultQueryType::Search => "SEARCH",
            DefaultQueryType::Lookback => "LOOKBACK",
        }
    }
}

impl QueryType for DefaultQueryType {
    fn wire_name(&self) -> &str {
        &DEFAULT_WIRE_NAMES[*self as usize]
    }
}

/// An application-defined query kind.
///
/// The wire name is derived from the tag once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedQueryType {
    tag: String,
    wire_name: String,
}

impl NamedQueryType {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let wire_name = wire_name_for(&tag);
        Self { tag, wire_name }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl QueryType for NamedQueryType {
    fn wire_name(&self) -> &str {
        &self.wire_name
    }
}

/// Shared handle to any query kind, as stored on a query.
#[derive(Debug, Clone)]
pub struct QueryTypeRef(Arc<dyn QueryType>);

impl QueryTypeRef {
    pub fn new(query_type: impl QueryType + 'static) -> Self {
        Self(Arc::new(query_type))
    }

    pub fn wire_name(&self) -> &str {
        self.0.wire_name()
    }
}

impl From<DefaultQueryType> for QueryTypeRef {
    fn from(query_type: DefaultQueryType) -> Self {
        Self::new(query_type)
    }
}

impl From<NamedQueryType> for QueryTypeRef {
    fn from(query_type: NamedQueryType) -> Self {
        Self::new(query_type)
    }
}

impl PartialEq for QueryTypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.wire_name() == other.wire_name()
    }
}

impl Eq for QueryTypeRef {}

impl PartialEq<DefaultQueryType> for QueryTypeRef {
    fn eq(&self, other: &DefaultQueryType) -> bool {
        self.wire_name() == other.wire_name()
    }
}

impl fmt::Display for QueryTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl Serialize for QueryTypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}
