use crate::dictionary::{token_index, Dictionary};
use crate::store::JsonNode;
use serde_json::Value;

/// Rewrites a normalized node into dictionary-token form.
///
/// Predicate keys, `@type` members (including value-object datatypes), and
/// `@id` values are compressed. JSON-LD keywords themselves and `@value`
/// payloads are never touched.
pub fn compress_node(dictionary: &Dictionary, node: &JsonNode) -> JsonNode {
    let mut compressed = JsonNode::new();
    for (key, value) in node {
        match key.as_str() {
            "@id" => {
                compressed.insert(key.clone(), compress_string(dictionary, value));
            }
            "@type" => {
                compressed.insert(key.clone(), compress_type_array(dictionary, value));
            }
            key if key.starts_with('@') => {
                compressed.insert(key.to_owned(), value.clone());
            }
            _ => {
                let key = dictionary.compress(key).into_owned();
                compressed.insert(key, compress_values(dictionary, value));
            }
        }
    }
    compressed
}

fn compress_values(dictionary: &Dictionary, value: &Value) -> Value {
    let Some(members) = value.as_array() else {
        return value.clone();
    };
    let members = members
        .iter()
        .map(|member| match member.as_object() {
            Some(object) => {
                let mut object = object.clone();
                if let Some(id) = object.get("@id") {
                    let id = compress_string(dictionary, id);
                    object.insert("@id".to_owned(), id);
                }
                if let Some(datatype) = object.get("@type") {
                    let datatype = compress_string(dictionary, datatype);
                    object.insert("@type".to_owned(), datatype);
                }
                Value::Object(object)
            }
            None => member.clone(),
        })
        .collect();
    Value::Array(members)
}

fn compress_type_array(dictionary: &Dictionary, value: &Value) -> Value {
    match value {
        Value::Array(members) => Value::Array(
            members
                .iter()
                .map(|member| compress_string(dictionary, member))
                .collect(),
        ),
        other => compress_string(dictionary, other),
    }
}

fn compress_string(dictionary: &Dictionary, value: &Value) -> Value {
    match value.as_str() {
        Some(text) => Value::String(dictionary.compress(text).into_owned()),
        None => value.clone(),
    }
}

/// Expands a stored node on graph egress.
///
/// Only the exact token form `z:<n>` is decoded, and only where the
/// compressor put it: predicate keys, `@type` members, and `@id` values.
pub fn expand_graph_node(dictionary: &Dictionary, node: &JsonNode) -> JsonNode {
    let mut expanded = JsonNode::new();
    for (key, value) in node {
        match key.as_str() {
            "@id" => {
                expanded.insert(key.clone(), expand_string(dictionary, value));
            }
            "@type" => {
                expanded.insert(key.clone(), expand_type_array(dictionary, value));
            }
            key if key.starts_with('@') => {
                expanded.insert(key.to_owned(), value.clone());
            }
            _ => {
                let key = dictionary.expand(key).to_owned();
                expanded.insert(key, expand_values(dictionary, value));
            }
        }
    }
    expanded
}

fn expand_values(dictionary: &Dictionary, value: &Value) -> Value {
    let Some(members) = value.as_array() else {
        return value.clone();
    };
    let members = members
        .iter()
        .map(|member| match member.as_object() {
            Some(object) => {
                let mut object = object.clone();
                if let Some(id) = object.get("@id") {
                    let id = expand_string(dictionary, id);
                    object.insert("@id".to_owned(), id);
                }
                if let Some(datatype) = object.get("@type") {
                    let datatype = expand_string(dictionary, datatype);
                    object.insert("@type".to_owned(), datatype);
                }
                Value::Object(object)
            }
            None => member.clone(),
        })
        .collect();
    Value::Array(members)
}

fn expand_type_array(dictionary: &Dictionary, value: &Value) -> Value {
    match value {
        Value::Array(members) => Value::Array(
            members
                .iter()
                .map(|member| expand_string(dictionary, member))
                .collect(),
        ),
        other => expand_string(dictionary, other),
    }
}

fn expand_string(dictionary: &Dictionary, value: &Value) -> Value {
    match value.as_str() {
        Some(text) => Value::String(dictionary.expand(text).to_owned()),
        None => value.clone(),
    }
}

/// Deep expansion for query results.
///
/// Unlike graph egress, bindings may embed tokens inside larger strings
/// (for instance `<z:4>` inside a serialized term), so every string in the
/// tree is decoded: exact tokens are replaced outright and embedded
/// `<z:<n>>` references are rewritten in place.
pub fn expand_query_value(dictionary: &Dictionary, value: &mut Value) {
    match value {
        Value::String(text) => {
            if token_index(text).is_some() {
                *text = dictionary.expand(text).to_owned();
            } else if text.contains("<z:") {
                *text = expand_embedded(dictionary, text);
            }
        }
        Value::Array(members) => {
            for member in members {
                expand_query_value(dictionary, member);
            }
        }
        Value::Object(object) => {
            for member in object.values_mut() {
                expand_query_value(dictionary, member);
            }
        }
        _ => {}
    }
}

/// Rewrites every `<z:<n>>` occurrence inside `text`.
fn expand_embedded(dictionary: &Dictionary, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<z:") {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);
        match tail[1..].find('>') {
            Some(end) => {
                let token = &tail[1..1 + end];
                out.push('<');
                out.push_str(dictionary.expand(token));
                out.push('>');
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str(tail);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
