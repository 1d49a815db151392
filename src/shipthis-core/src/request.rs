use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::route::{Route, Verb};

/// A single outbound call, built fresh for each operation and consumed by the client
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub verb: Verb,
    /// Path relative to the API root
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Per-call headers, applied last
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    pub fn new(verb: Verb, route: Route<'_>) -> Result<Self, ValidationError> {
        Ok(Self::raw(verb, route.path()?))
    }

    /// Build a request for a path outside the [`Route`] table
    pub fn raw(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
