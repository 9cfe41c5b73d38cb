// src/model/datasource.rs
use crate::query::GroupByQuery;
use serde::Serialize;
use std::sync::Arc;

/// Where a query reads its rows from.
///
/// A `Query` data source nests another query; that is how inner queries
/// arise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DataSource {
    Table {
        name: String,
    },
    Union {
        #[serde(rename = "dataSources")]
        data_sources: Vec<String>,
    },
    Query {
        query: Arc<GroupByQuery>,
    },
}

impl DataSource {
    pub fn table(name: impl Into<String>) -> Self {
        DataSource::Table { name: name.into() }
    }

    pub fn union<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DataSource::Union {
            data_sources: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn query(query: GroupByQuery) -> Self {
        DataSource::Query {
            query: Arc::new(query),
        }
    }

    /// The wrapped query, if this data source nests one.
    pub fn inner_query(&self) -> Option<&GroupByQuery> {
        match self {
            DataSource::Query { query } => Some(query.as_ref()),
            _ => None,
        }
    }

    /// Physical table names, looking through nested queries.
    pub fn names(&self) -> Vec<&str> {
        match self {
            DataSource::Table { name } => vec![name.as_str()],
            DataSource::Union { data_sources } => {
                data_sources.iter().map(String::as_str).collect()
            }
            DataSource::Query { query } => {
                use crate::query::FactQuery;
                query.data_source().names()
            }
        }
    }
}
