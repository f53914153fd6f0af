//! Document list filters.
//!
//! Queries travel as JSON strings in repeated `queries[]` URL parameters,
//! e.g. `{"method":"equal","attribute":"userId","values":["64f0"]}`.

use core::fmt;

use serde::Serialize;
use serde_json::Value;

/// Largest page size the backend accepts.
pub const MAX_LIMIT: u32 = 5000;

/// A single list filter, sort or pagination directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    values: Vec<Value>,
}

impl Query {
    fn new(method: &'static str, attribute: Option<&str>, values: Vec<Value>) -> Self {
        Self {
            method,
            attribute: attribute.map(str::to_owned),
            values,
        }
    }

    /// Attribute equals `value`.
    #[must_use]
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Self::new("equal", Some(attribute), vec![value.into()])
    }

    /// Attribute equals any of `values`.
    #[must_use]
    pub fn equal_any<V: Into<Value>>(attribute: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(
            "equal",
            Some(attribute),
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// Full-text search on an attribute with a full-text index.
    #[must_use]
    pub fn search(attribute: &str, term: &str) -> Self {
        Self::new("search", Some(attribute), vec![Value::from(term)])
    }

    /// Sort descending by attribute (e.g., `$createdAt`).
    #[must_use]
    pub fn order_desc(attribute: &str) -> Self {
        Self::new("orderDesc", Some(attribute), Vec::new())
    }

    /// Sort ascending by attribute.
    #[must_use]
    pub fn order_asc(attribute: &str) -> Self {
        Self::new("orderAsc", Some(attribute), Vec::new())
    }

    /// Page size, clamped to [`MAX_LIMIT`].
    #[must_use]
    pub fn limit(limit: u32) -> Self {
        Self::new("limit", None, vec![Value::from(limit.min(MAX_LIMIT))])
    }

    /// Number of documents to skip.
    #[must_use]
    pub fn offset(offset: u64) -> Self {
        Self::new("offset", None, vec![Value::from(offset)])
    }

    /// Query method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// Whether this query controls paging rather than filtering.
    #[must_use]
    pub fn is_paging(&self) -> bool {
        matches!(self.method, "limit" | "offset")
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Serialising a struct of strings and JSON values cannot fail.
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_format() {
        assert_eq!(
            Query::equal("userId", "64f0").to_string(),
            r#"{"method":"equal","attribute":"userId","values":["64f0"]}"#
        );
    }

    #[test]
    fn test_equal_any_format() {
        assert_eq!(
            Query::equal_any("status", ["pending", "processing"]).to_string(),
            r#"{"method":"equal","attribute":"status","values":["pending","processing"]}"#
        );
    }

    #[test]
    fn test_order_omits_values() {
        assert_eq!(
            Query::order_desc("$createdAt").to_string(),
            r#"{"method":"orderDesc","attribute":"$createdAt"}"#
        );
    }

    #[test]
    fn test_paging_omits_attribute() {
        assert_eq!(
            Query::limit(25).to_string(),
            r#"{"method":"limit","values":[25]}"#
        );
        assert_eq!(
            Query::offset(50).to_string(),
            r#"{"method":"offset","values":[50]}"#
        );
        assert!(Query::limit(1).is_paging());
        assert!(!Query::search("name", "vase").is_paging());
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(
            Query::limit(10_000).to_string(),
            r#"{"method":"limit","values":[5000]}"#
        );
    }
}
