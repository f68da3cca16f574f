//! Ancestor-resolution rules.
//!
//! Which ancestor attributes get copied into descendant documents is data,
//! not code: an ordered table of rules, each naming a target ancestor kind
//! and the properties to pull from it. The standard table propagates cloud,
//! account, and region identity into descendant metadata so those common
//! query dimensions exist on every node without the collector duplicating
//! them.

use serde_json::Value as Json;

use crate::types::Section;

/// One property to copy from a resolved ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveProp {
    /// Section of the descendant document to write into.
    pub section: Section,
    /// Attribute name to write.
    pub name: String,
    /// Path into the ancestor's document to read from. The first segment
    /// names a section, the rest descend into nested objects.
    pub extract_path: Vec<String>,
}

impl ResolveProp {
    /// Create a rule writing `name` into `section`, reading `extract_path`
    /// from the resolved ancestor.
    pub fn new(section: Section, name: impl Into<String>, extract_path: &[&str]) -> Self {
        Self {
            section,
            name: name.into(),
            extract_path: extract_path.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// All properties to resolve from the nearest ancestor of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorResolver {
    /// Ancestor kind to search for, matched against the kind hierarchy of
    /// candidate ancestors.
    pub kind: String,
    /// Properties to copy when such an ancestor exists.
    pub props: Vec<ResolveProp>,
}

impl AncestorResolver {
    /// Create a resolver for one ancestor kind.
    pub fn new(kind: impl Into<String>, props: Vec<ResolveProp>) -> Self {
        Self {
            kind: kind.into(),
            props,
        }
    }

    /// Shorthand for the common shape: copy the ancestor's reported `id`
    /// and `name` into descendant metadata as `<prefix>_id` / `<prefix>_name`.
    fn identity(kind: &str) -> Self {
        Self::new(
            kind,
            vec![
                ResolveProp::new(
                    Section::Metadata,
                    format!("{kind}_id"),
                    &["reported", "id"],
                ),
                ResolveProp::new(
                    Section::Metadata,
                    format!("{kind}_name"),
                    &["reported", "name"],
                ),
            ],
        )
    }
}

/// Ordered set of ancestor-resolution rules applied during materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverTable {
    rules: Vec<AncestorResolver>,
}

impl ResolverTable {
    /// Create an empty table. Materialization then performs no resolution.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: AncestorResolver) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rules in application order.
    pub fn rules(&self) -> &[AncestorResolver] {
        &self.rules
    }
}

impl Default for ResolverTable {
    /// The standard table: cloud, account, and region identity flows into
    /// descendant metadata.
    fn default() -> Self {
        Self {
            rules: vec![
                AncestorResolver::identity("cloud"),
                AncestorResolver::identity("account"),
                AncestorResolver::identity("region"),
            ],
        }
    }
}

/// Walk a key path into nested JSON objects.
///
/// Returns the value at the end of the path, or `None` when any segment is
/// missing or lands in a non-object. A JSON `null` leaf counts as absent.
pub fn value_in_path<'a>(value: &'a Json, path: &[String]) -> Option<&'a Json> {
    let mut current = value;
    for segment in path {
        current = current.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}
