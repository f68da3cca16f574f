//! Schema model collaborator.
//!
//! Kind typing and value validation live behind the [`Model`] trait; the
//! kernel only consumes the verdicts. [`StaticModel`] is the in-crate
//! implementation backed by a fixed catalog, enough for tests and for
//! callers without a full schema engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use thiserror::Error;

/// Resolved kind handle for a node.
///
/// Carries the kind name and its hierarchy, most specific first. The
/// hierarchy is never empty: a kind without ancestry reports just itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind {
    name: String,
    hierarchy: Vec<String>,
}

impl Kind {
    /// Create a kind handle. An empty hierarchy falls back to the name alone.
    pub fn new(name: impl Into<String>, hierarchy: Vec<String>) -> Self {
        let name = name.into();
        let hierarchy = if hierarchy.is_empty() {
            vec![name.clone()]
        } else {
            hierarchy
        };
        Self { name, hierarchy }
    }

    /// The kind name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind hierarchy, most specific first.
    pub fn kind_hierarchy(&self) -> &[String] {
        &self.hierarchy
    }
}

/// Error returned by a model when a reported section fails validation.
#[derive(Debug, Clone, Error)]
#[error("validation failed for kind {kind}: {message}")]
pub struct ValidationError {
    /// The kind whose schema rejected the value.
    pub kind: String,
    /// What the schema objected to.
    pub message: String,
}

/// Schema knowledge consulted during graph construction.
///
/// `check_valid` may coerce: a returned `Some` value supersedes the raw
/// input wholesale, so defaults and type fixes applied by the schema end up
/// in the stored node.
pub trait Model {
    /// Validate a reported section, optionally returning a coerced
    /// replacement.
    fn check_valid(&self, reported: &Json) -> Result<Option<Json>, ValidationError>;

    /// Resolve the kind handle for a reported section.
    fn kind_of(&self, reported: &Json) -> Kind;
}

/// Minimal model backed by a fixed kind catalog.
///
/// Validation only requires a string `kind` attribute; kinds missing from
/// the catalog resolve to a hierarchy of just themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticModel {
    hierarchies: BTreeMap<String, Vec<String>>,
}

impl StaticModel {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind hierarchy, most specific first.
    pub fn with_kind(mut self, name: impl Into<String>, hierarchy: &[&str]) -> Self {
        self.hierarchies
            .insert(name.into(), hierarchy.iter().map(|s| s.to_string()).collect());
        self
    }
}

impl Model for StaticModel {
    fn check_valid(&self, reported: &Json) -> Result<Option<Json>, ValidationError> {
        if reported.get("kind").and_then(Json::as_str).is_none() {
            return Err(ValidationError {
                kind: "unknown".to_string(),
                message: "reported section carries no string kind".to_string(),
            });
        }
        Ok(None)
    }

    fn kind_of(&self, reported: &Json) -> Kind {
        let name = reported
            .get("kind")
            .and_then(Json::as_str)
            .unwrap_or("unknown");
        match self.hierarchies.get(name) {
            Some(hierarchy) => Kind::new(name, hierarchy.clone()),
            None => Kind::new(name, Vec::new()),
        }
    }
}
