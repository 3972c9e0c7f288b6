//! Recursive encoding of heterogeneous configuration values.
//!
//! Flow nodes carry arbitrary JSON under their configuration keys. Rather
//! than leaning on dynamic typing, values are dispatched on a three-way
//! classification and encoded through dedicated resource types:
//!
//! - primitives become `schema:PropertyValue`,
//! - arrays become `schema:ItemList` with positioned `schema:ListItem`s,
//! - objects become `schema:StructuredValue` with nested properties,
//!   keys visited in sorted order.
//!
//! Every generated identifier depends only on the parent identifier and
//! the key/index path, which keeps re-runs stable.

use serde_json::Value;
use urdf_store::vocab::schema;
use urdf_store::JsonNode;

/// Encodes one configuration entry under `parent_id`, appending the
/// auxiliary nodes to `graph` and returning the entry node's identifier.
pub fn encode_property(
    graph: &mut Vec<JsonNode>,
    parent_id: &str,
    key: &str,
    value: &Value,
) -> String {
    let id = format!("{parent_id}:{}", urn_encode(key));
    encode_value(graph, &id, Some(key), value);
    id
}

fn encode_value(graph: &mut Vec<JsonNode>, id: &str, name: Option<&str>, value: &Value) {
    match value {
        Value::Array(items) => {
            let mut node = aux_node(id, schema::ITEM_LIST, name);
            let mut elements = Vec::with_capacity(items.len());
            for (position, item) in items.iter().enumerate() {
                let item_id = format!("{id}:{position}");
                let mut item_node = aux_node(&item_id, schema::LIST_ITEM, None);
                item_node.insert(
                    schema::POSITION.to_owned(),
                    serde_json::json!([{ "@value": position }]),
                );
                let item_value = if is_primitive(item) {
                    serde_json::json!([{ "@value": item }])
                } else {
                    let nested_id = format!("{item_id}:v");
                    encode_value(graph, &nested_id, None, item);
                    serde_json::json!([{ "@id": nested_id }])
                };
                item_node.insert(schema::ITEM.to_owned(), item_value);
                graph.push(item_node);
                elements.push(serde_json::json!({ "@id": item_id }));
            }
            node.insert(
                schema::ITEM_LIST_ELEMENT.to_owned(),
                Value::Array(elements),
            );
            graph.push(node);
        }
        Value::Object(entries) => {
            let mut node = aux_node(id, schema::STRUCTURED_VALUE, name);
            let mut nested = Vec::with_capacity(entries.len());
            // serde_json maps iterate in key order, so the traversal is
            // already the sorted order the identifiers depend on.
            for (key, value) in entries {
                let child_id = encode_property(graph, id, key, value);
                nested.push(serde_json::json!({ "@id": child_id }));
            }
            node.insert(schema::ADDITIONAL_PROPERTY.to_owned(), Value::Array(nested));
            graph.push(node);
        }
        primitive => {
            let mut node = aux_node(id, schema::PROPERTY_VALUE, name);
            node.insert(
                schema::VALUE.to_owned(),
                serde_json::json!([{ "@value": primitive }]),
            );
            graph.push(node);
        }
    }
}

fn aux_node(id: &str, class: &str, name: Option<&str>) -> JsonNode {
    let mut node = JsonNode::new();
    node.insert("@id".to_owned(), Value::from(id));
    node.insert("@type".to_owned(), serde_json::json!([class]));
    if let Some(name) = name {
        node.insert(
            schema::NAME.to_owned(),
            serde_json::json!([{ "@value": name }]),
        );
    }
    node
}

fn is_primitive(value: &Value) -> bool {
    !(value.is_array() || value.is_object())
}

/// Percent-encodes every byte outside `[A-Za-z0-9._-]` so arbitrary
/// configuration keys stay URN-safe.
pub fn urn_encode(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for byte in part.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                out.push(byte as char);
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
