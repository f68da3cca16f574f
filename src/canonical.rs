//! Canonical JSON serialization and content hashing.
//!
//! ## Purpose
//!
//! Change detection compares nodes across collect runs by hash, so the hash
//! input must be byte-stable for semantically equal documents:
//!
//! 1. **Determinism**: same document, same bytes, regardless of the order
//!    object keys were inserted in.
//! 2. **Change sensitivity**: any change in any hashed section changes the
//!    hash.
//!
//! ## Canonical form
//!
//! UTF-8 JSON with object keys emitted in lexicographic order at every
//! nesting level and compact separators. Arrays keep their index order;
//! array order is semantic.
//!
//! The writer sorts explicitly instead of relying on map-ordering behavior
//! of the JSON library, which changes with feature flags.

use serde_json::Value as Json;
use sha2::{Digest, Sha256};

/// Serialize a JSON value to canonical bytes for hashing.
pub fn to_canonical_bytes(value: &Json) -> Vec<u8> {
    let mut out = Vec::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Json, out: &mut Vec<u8>) {
    match value {
        Json::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_scalar(key, out);
                out.push(b':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push(b'}');
        }
        Json::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_scalar<T: serde::Serialize>(value: &T, out: &mut Vec<u8>) {
    // Scalar serialization to a Vec cannot fail.
    serde_json::to_writer(out, value).expect("scalar serialization failed");
}

/// Compute the SHA-256 content hash of a node's sections.
///
/// Hashes the canonical bytes of `reported`, then `desired` and `metadata`
/// when present, in that order. Returned as a 64-character lowercase hex
/// string. A present-but-empty section still participates, so adding an
/// empty `desired` is a detectable change.
pub fn content_hash(reported: &Json, desired: Option<&Json>, metadata: Option<&Json>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(to_canonical_bytes(reported));
    if let Some(desired) = desired {
        hasher.update(to_canonical_bytes(desired));
    }
    if let Some(metadata) = metadata {
        hasher.update(to_canonical_bytes(metadata));
    }
    hex::encode(hasher.finalize())
}
