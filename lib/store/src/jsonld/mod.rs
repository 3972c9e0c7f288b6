//! JSON-LD normalization.
//!
//! Three transformations keep the store's node shape stable:
//!
//! 1. [`flatten`] lifts every embedded node to the top of its graph and
//!    promotes scalar predicate values to arrays of value objects.
//! 2. [`compress_node`] rewrites IRIs to `z:<n>` dictionary tokens.
//! 3. [`expand_graph_node`] / [`expand_query_value`] undo the compression
//!    on egress.
//!
//! The array-valued predicate contract is checked by [`ensure_array_valued`]
//! before anything reaches the store.

mod codec;
mod flatten;

pub use codec::{compress_node, expand_graph_node, expand_query_value};
pub use flatten::{flatten, FlatGraph};

use crate::error::StoreError;
use crate::store::JsonNode;
use serde_json::Value;

/// Whether `key` is a JSON-LD keyword (`@id`, `@type`, `@value`, ...).
pub fn is_keyword(key: &str) -> bool {
    key.starts_with('@')
}

/// Whether `object` is a value object, i.e. carries `@value`.
pub fn is_value_object(object: &JsonNode) -> bool {
    object.contains_key("@value")
}

/// Whether `object` is a reference object, i.e. carries only `@id`.
pub fn is_reference_object(object: &JsonNode) -> bool {
    object.len() == 1 && object.contains_key("@id")
}

/// Whether `object` is node-like: it carries `@type` or at least one
/// non-keyword predicate, so flattening must hoist it to the graph level.
pub fn is_node_like(object: &JsonNode) -> bool {
    object
        .keys()
        .any(|key| key == "@type" || !is_keyword(key))
}

/// Checks the store-wide contract that every key other than `@id` maps to
/// an array. Violating producers are rejected before any load.
pub fn ensure_array_valued(nodes: &[JsonNode]) -> Result<(), StoreError> {
    for node in nodes {
        for (key, value) in node {
            if key == "@id" {
                continue;
            }
            if !value.is_array() {
                let id = node
                    .get("@id")
                    .and_then(Value::as_str)
                    .unwrap_or("<no @id>");
                return Err(StoreError::SchemaViolation(format!(
                    "predicate '{key}' of node '{id}' is not array-valued"
                )));
            }
        }
    }
    Ok(())
}

/// Number of triples a normalized node contributes: one per `@type` member
/// plus one per value object under each predicate.
pub fn triple_count(node: &JsonNode) -> usize {
    node.iter()
        .filter(|(key, _)| *key != "@id")
        .map(|(_, value)| value.as_array().map_or(0, Vec::len))
        .sum()
}
