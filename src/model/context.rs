//! Query context.
//!
//! A context carries a query id made of a base id shared by a query and
//! everything derived from it, plus a sequence number. Forking keeps the base
//! and draws a fresh sequence number from a process-wide counter, so nested
//! and weight-evaluation queries built concurrently never share an id.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static FORK_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn next_sequence() -> u64 {
    FORK_SEQUENCE.fetch_add(1, Ordering::Relaxed) + 1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    base_id: String,
    sequence: u64,
    /// Backend timeout in milliseconds.
    timeout: Option<u64>,
    priority: Option<i32>,
    use_cache: Option<bool>,
    populate_cache: Option<bool>,
    by_segment: Option<bool>,
}

impl QueryContext {
    /// A fresh root context with a random base id.
    pub fn new() -> Self {
        Self::with_base_id(Uuid::new_v4().to_string())
    }

    pub fn with_base_id(base_id: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            sequence: next_sequence(),
            timeout: None,
            priority: None,
            use_cache: None,
            populate_cache: None,
            by_segment: None,
        }
    }

    /// A new nested scope: same base id, fresh sequence number.
    pub fn fork(&self) -> Self {
        Self {
            sequence: next_sequence(),
            ..self.clone()
        }
    }

    /// Fork or copy depending on `do_fork`.
    pub fn derive(&self, do_fork: bool) -> Self {
        if do_fork {
            self.fork()
        } else {
            self.clone()
        }
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn query_id(&self) -> String {
        format!("{}_{}", self.base_id, self.sequence)
    }

    pub fn timeout(&self) -> Option<u64> {
        self.timeout
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn use_cache(&self) -> Option<bool> {
        self.use_cache
    }

    pub fn populate_cache(&self) -> Option<bool> {
        self.populate_cache
    }

    pub fn by_segment(&self) -> Option<bool> {
        self.by_segment
    }

    pub fn with_timeout(self, timeout_ms: u64) -> Self {
        Self {
            timeout: Some(timeout_ms),
            ..self
        }
    }

    pub fn with_priority(self, priority: i32) -> Self {
        Self {
            priority: Some(priority),
            ..self
        }
    }

    pub fn with_use_cache(self, use_cache: bool) -> Self {
        Self {
            use_cache: Some(use_cache),
            ..self
        }
    }

    pub fn with_populate_cache(self, populate_cache: bool) -> Self {
        Self {
            populate_cache: Some(populate_cache),
            ..self
        }
    }

    pub fn with_by_segment(self, by_segment: bool) -> Self {
        Self {
            by_segment: Some(by_segment),
            ..self
        }
    }

    /// Turn off both cache reads and writes.
    pub fn bypass_cache(self) -> Self {
        self.with_use_cache(false).with_populate_cache(false)
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for QueryContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("queryId", &self.query_id())?;
        if let Some(timeout) = self.timeout {
            map.serialize_entry("timeout", &timeout)?;
        }
        if let Some(priority) = self.priority {
            map.serialize_entry("priority", &priority)?;
        }
        if let Some(use_cache) = self.use_cache {
            map.serialize_entry("useCache", &use_cache)?;
        }
        if let Some(populate_cache) = self.populate_cache {
            map.serialize_entry("populateCache", &populate_cache)?;
        }
        if let Some(by_segment) = self.by_segment {
            map.serialize_entry("bySegment", &by_segment)?;
        }
        map.end()
    }
}
