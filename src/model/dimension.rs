// src/model/dimension.rs
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A dimension a query can group or filter on.
///
/// Identity is the api name: two handles with the same name are the same
/// dimension, whatever cardinality they carry.
#[derive(Debug, Clone)]
pub struct Dimension {
    api_name: String,
    /// Distinct value count; zero or negative means unknown.
    cardinality: i64,
}

impl Dimension {
    pub fn new(api_name: impl Into<String>, cardinality: i64) -> Self {
        Self {
            api_name: api_name.into(),
            cardinality,
        }
    }

    /// A dimension with no cardinality metadata.
    pub fn unknown(api_name: impl Into<String>) -> Self {
        Self::new(api_name, 0)
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    pub fn cardinality(&self) -> i64 {
        self.cardinality
    }

    pub fn has_known_cardinality(&self) -> bool {
        self.cardinality > 0
    }
}

impl PartialEq for Dimension {
    fn eq(&self, other: &Self) -> bool {
        self.api_name == other.api_name
    }
}

impl Eq for Dimension {}

impl Hash for Dimension {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.api_name.hash(state);
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.api_name)
    }
}

impl Serialize for Dimension {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.api_name)
    }
}
