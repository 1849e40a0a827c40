//! The query key type
//!
//! A [`QueryKey`] is a sequence of segments: string literals for the
//! hierarchy (domain, operation, id) and at most one trailing parameter
//! segment holding a filter object. Parameter segments compare by their
//! canonical serialization, making key equality independent of filter
//! property order.

use crate::canonical::canonical_json;
use serde_json::Value as JsonValue;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Filter parameters canonicalized for order-independent comparison
#[derive(Debug, Clone)]
pub struct CanonicalParams {
    value: JsonValue,
    canonical: String,
}

impl CanonicalParams {
    /// Canonicalize a JSON value
    #[must_use]
    pub fn new(value: JsonValue) -> Self {
        let canonical = canonical_json(&value);
        Self { value, canonical }
    }

    /// The original JSON value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    /// The canonical serialization equality is defined over
    #[inline]
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl PartialEq for CanonicalParams {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for CanonicalParams {}

impl Hash for CanonicalParams {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl From<JsonValue> for CanonicalParams {
    fn from(value: JsonValue) -> Self {
        Self::new(value)
    }
}

/// One step of a key's hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Fixed hierarchy step (domain, operation, id)
    Literal(String),
    /// Filter object, canonicalized
    Params(CanonicalParams),
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.write_str(s),
            Self::Params(p) => f.write_str(p.canonical()),
        }
    }
}

/// Hierarchical, order-independent identifier for cached server data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    segments: Vec<Segment>,
}

impl QueryKey {
    /// The empty key — a prefix of every key
    #[must_use]
    pub fn new() -> Self {
        Self { segments: Vec::new() }
    }

    /// Start a key at a domain root
    #[must_use]
    pub fn root(domain: impl Into<String>) -> Self {
        Self { segments: vec![Segment::Literal(domain.into())] }
    }

    /// Append a literal segment
    #[must_use]
    pub fn push(mut self, literal: impl Into<String>) -> Self {
        self.segments.push(Segment::Literal(literal.into()));
        self
    }

    /// Append a parameter segment
    #[must_use]
    pub fn with_params(mut self, params: impl Into<CanonicalParams>) -> Self {
        self.segments.push(Segment::Params(params.into()));
        self
    }

    /// The key's segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the key has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `prefix` is a leading subsequence of this key
    ///
    /// Every key is a prefix of itself. The empty key is a prefix of
    /// everything; invalidating it reaches the whole cache.
    #[must_use]
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        prefix.segments.len() <= self.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }
}

impl Default for QueryKey {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn equal_filters_in_any_order_give_equal_keys() {
        let k1 = QueryKey::root("dashboards")
            .push("list")
            .with_params(CanonicalParams::new(json!({"workspace": "w1", "search": "rev"})));
        let k2 = QueryKey::root("dashboards").push("list").with_params(
            serde_json::from_str::<JsonValue>(r#"{"search":"rev","workspace":"w1"}"#).unwrap(),
        );
        assert_eq!(k1, k2);

        use std::collections::hash_map::DefaultHasher;
        let mut h1 = DefaultHasher::new();
        let mut h2 = DefaultHasher::new();
        k1.hash(&mut h1);
        k2.hash(&mut h2);
        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn different_filters_give_different_keys() {
        let k1 = QueryKey::root("dashboards").with_params(json!({"page": 1}));
        let k2 = QueryKey::root("dashboards").with_params(json!({"page": 2}));
        assert_ne!(k1, k2);
    }

    #[test]
    fn prefix_relation() {
        let root = QueryKey::root("dashboards");
        let detail = root.clone().push("detail").push("d1");
        let widgets = detail.clone().push("widgets");

        assert!(detail.starts_with(&root));
        assert!(widgets.starts_with(&detail));
        assert!(widgets.starts_with(&root));
        assert!(widgets.starts_with(&widgets));
        assert!(!detail.starts_with(&widgets));
        assert!(!detail.starts_with(&QueryKey::root("workspaces")));
    }

    #[test]
    fn display_joins_segments() {
        let key = QueryKey::root("dashboards").push("list").with_params(json!({"a": 1}));
        assert_eq!(key.to_string(), r#"dashboards:list:{"a":1}"#);
    }
}
