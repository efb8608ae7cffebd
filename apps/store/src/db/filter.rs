//! Document filters with JSONB containment (`@>`) semantics
//!
//! A filter is a list of clauses; a document matches when it contains every
//! clause. Containment is recursive:
//! - objects: every key of the clause is present and contains the clause value
//! - arrays: every clause element is contained in some document element
//! - scalars: equality
//!
//! The Postgres driver hands the clauses to `@>` directly, the memory driver
//! evaluates them with [`json_contains`].

use serde_json::{json, Value as JsonValue};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<JsonValue>,
}

impl Filter {
    /// Matches every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches the document whose domain `id` equals `id`
    pub fn by_id(id: &str) -> Self {
        Self {
            clauses: vec![json!({ "id": id })],
        }
    }

    /// Build a filter from a single containment pattern (must be an object)
    pub fn from_pattern(pattern: JsonValue) -> Result<Self> {
        if !pattern.is_object() {
            return Err(Error::InvalidSearch(format!(
                "filter pattern must be a JSON object, got {pattern}"
            )));
        }
        Ok(Self {
            clauses: vec![pattern],
        })
    }

    /// Add a clause; all clauses must match
    pub fn and(mut self, other: Filter) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[JsonValue] {
        &self.clauses
    }

    /// Clauses as a JSON array, the form bound into SQL
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.clauses.clone())
    }

    pub fn matches(&self, document: &JsonValue) -> bool {
        self.clauses
            .iter()
            .all(|clause| json_contains(document, clause))
    }
}

/// `document @> pattern`, evaluated in memory
pub fn json_contains(document: &JsonValue, pattern: &JsonValue) -> bool {
    match (document, pattern) {
        (JsonValue::Object(doc), JsonValue::Object(pat)) => pat
            .iter()
            .all(|(key, value)| doc.get(key).is_some_and(|d| json_contains(d, value))),
        (JsonValue::Array(doc), JsonValue::Array(pat)) => pat
            .iter()
            .all(|p| doc.iter().any(|d| json_contains(d, p))),
        (JsonValue::Object(_), _) | (JsonValue::Array(_), _) => false,
        (doc, pat) => doc == pat,
    }
}
