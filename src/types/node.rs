//! Node identity and arena payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use std::fmt;

use crate::model::Kind;
use crate::types::Section;

/// Unique identifier for a resource node.
///
/// Wraps the caller-supplied id string and implements `Ord` for
/// deterministic ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Stored payload of a resource node.
///
/// Builder-produced nodes always carry `hash`, `kind`, and a non-empty
/// `kinds`; the `Option` fields exist because nodes can also be materialized
/// from storage, in which case access-side finalization backfills whatever
/// is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    /// Node identifier, mirroring the arena key.
    pub id: NodeId,
    /// State gathered by the collector. Mandatory.
    pub reported: Json,
    /// Requested target state.
    pub desired: Option<Json>,
    /// Annotations derived during import.
    pub metadata: Option<Json>,
    /// SHA-256 content hash over the canonical sections.
    pub hash: Option<String>,
    /// Schema kind handle. Internal; never serialized.
    #[serde(skip)]
    pub kind: Option<Kind>,
    /// Kind hierarchy, most specific first.
    pub kinds: Vec<String>,
    /// Flattened scalar text for full-text search.
    pub flat: Option<String>,
    /// Whether this node marks a merge boundary in an update graph.
    pub merge: bool,
}

impl NodeData {
    /// Create a bare node carrying only id and reported state.
    pub fn new(id: NodeId, reported: Json) -> Self {
        Self {
            id,
            reported,
            desired: None,
            metadata: None,
            hash: None,
            kind: None,
            kinds: Vec::new(),
            flat: None,
            merge: false,
        }
    }

    /// Set the desired section.
    pub fn with_desired(mut self, desired: Option<Json>) -> Self {
        self.desired = desired;
        self
    }

    /// Set the metadata section.
    pub fn with_metadata(mut self, metadata: Option<Json>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Mark the node as a merge boundary.
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// The `kind` attribute of the reported section, when it is a string.
    pub fn reported_kind(&self) -> Option<&str> {
        self.reported.get("kind").and_then(Json::as_str)
    }

    /// A section of this node's document, if present.
    pub fn section(&self, section: Section) -> Option<&Json> {
        match section {
            Section::Reported => Some(&self.reported),
            Section::Desired => self.desired.as_ref(),
            Section::Metadata => self.metadata.as_ref(),
        }
    }

    /// Mutable access to a section, creating an empty object for the
    /// optional sections on first use.
    pub fn section_mut(&mut self, section: Section) -> &mut Json {
        match section {
            Section::Reported => &mut self.reported,
            Section::Desired => self.desired.get_or_insert_with(|| json!({})),
            Section::Metadata => self.metadata.get_or_insert_with(|| json!({})),
        }
    }

    /// Export the node as its JSON document shape.
    ///
    /// Emits exactly what is present: absent sections are omitted, `merge`
    /// appears only when set, and the internal kind handle never leaves the
    /// arena. Callers that need the `hash`/`kinds`/`flat` guarantees go
    /// through access-side finalization first.
    pub fn to_document(&self) -> Json {
        let mut doc = serde_json::Map::new();
        doc.insert("id".to_string(), json!(self.id.as_str()));
        doc.insert("reported".to_string(), self.reported.clone());
        if let Some(desired) = &self.desired {
            doc.insert("desired".to_string(), desired.clone());
        }
        if let Some(metadata) = &self.metadata {
            doc.insert("metadata".to_string(), metadata.clone());
        }
        if let Some(hash) = &self.hash {
            doc.insert("hash".to_string(), json!(hash));
        }
        if !self.kinds.is_empty() {
            doc.insert("kinds".to_string(), json!(self.kinds));
        }
        if let Some(flat) = &self.flat {
            doc.insert("flat".to_string(), json!(flat));
        }
        if self.merge {
            doc.insert("merge".to_string(), json!(true));
        }
        Json::Object(doc)
    }
}

// Equality and ordering follow the id for deterministic collections.
impl PartialEq for NodeData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeData {}

impl PartialOrd for NodeData {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeData {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
