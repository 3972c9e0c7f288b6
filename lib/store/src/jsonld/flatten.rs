use crate::jsonld::{is_node_like, is_reference_object, is_value_object};
use crate::store::JsonNode;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// One named graph produced by [`flatten`]. A `None` id means the dataset
/// did not name the graph and the caller decides where the nodes land.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatGraph {
    pub id: Option<String>,
    pub nodes: Vec<JsonNode>,
}

/// Flattens a JSON-LD document into graphs of top-level nodes.
///
/// Accepted input shapes: a dataset array of graph objects
/// (`{"@id": gid, "@graph": [...]}`), a single graph object, an array of
/// nodes, or a single node. Embedded node-like objects are hoisted to the
/// top of their containing graph and replaced in place by `{"@id": ...}`
/// references; nodes without an `@id` receive a generated blank-node
/// identifier that does not collide with any identifier already present.
/// Scalars under a predicate are promoted to single-element arrays of
/// value objects. `@context` entries are discarded.
pub fn flatten(doc: &Value) -> Vec<FlatGraph> {
    let mut flattener = Flattener::new(doc);
    match doc {
        Value::Array(entries) => {
            // A dataset array may mix graph objects and bare nodes; bare
            // nodes accumulate into one unnamed graph.
            let mut graphs = Vec::new();
            let mut loose = Vec::new();
            for entry in entries {
                match entry.as_object() {
                    Some(object) if object.contains_key("@graph") => {
                        graphs.push(flattener.flatten_graph_object(object));
                    }
                    Some(object) => loose.push(object),
                    None => {}
                }
            }
            if !loose.is_empty() {
                let nodes = flattener.flatten_nodes(loose.into_iter());
                graphs.push(FlatGraph { id: None, nodes });
            }
            graphs
        }
        Value::Object(object) if object.contains_key("@graph") => {
            vec![flattener.flatten_graph_object(object)]
        }
        Value::Object(object) => {
            let nodes = flattener.flatten_nodes(std::iter::once(object));
            vec![FlatGraph { id: None, nodes }]
        }
        _ => Vec::new(),
    }
}

struct Flattener {
    used_ids: HashSet<String>,
    blank_counter: usize,
}

impl Flattener {
    fn new(doc: &Value) -> Self {
        let mut used_ids = HashSet::new();
        collect_ids(doc, &mut used_ids);
        Self {
            used_ids,
            blank_counter: 0,
        }
    }

    fn flatten_graph_object(&mut self, object: &Map<String, Value>) -> FlatGraph {
        let id = object
            .get("@id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let members = object
            .get("@graph")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let nodes = self.flatten_nodes(members.iter().filter_map(Value::as_object));
        FlatGraph { id, nodes }
    }

    fn flatten_nodes<'a>(
        &mut self,
        members: impl Iterator<Item = &'a Map<String, Value>>,
    ) -> Vec<JsonNode> {
        let mut out = Vec::new();
        for member in members {
            self.flatten_node(member, &mut out);
        }
        out
    }

    /// Normalizes one node, appending it and every hoisted descendant to
    /// `out`. Returns the node's identifier.
    fn flatten_node(&mut self, object: &Map<String, Value>, out: &mut Vec<JsonNode>) -> String {
        let id = match object.get("@id").and_then(Value::as_str) {
            Some(id) => id.to_owned(),
            None => self.fresh_blank_id(),
        };

        // Reserve the slot up front so the containing node precedes every
        // descendant hoisted while its predicates are normalized.
        let slot = out.len();
        out.push(JsonNode::new());

        let mut node = JsonNode::new();
        node.insert("@id".to_owned(), Value::String(id.clone()));

        for (key, value) in object {
            match key.as_str() {
                "@id" | "@context" => {}
                "@type" => {
                    let types = match value {
                        Value::String(single) => vec![Value::String(single.clone())],
                        Value::Array(members) => members
                            .iter()
                            .filter(|member| member.is_string())
                            .cloned()
                            .collect(),
                        _ => Vec::new(),
                    };
                    node.insert("@type".to_owned(), Value::Array(types));
                }
                key if key.starts_with('@') => {}
                _ => {
                    let values = self.normalize_values(value, out);
                    node.insert(key.clone(), Value::Array(values));
                }
            }
        }

        out[slot] = node;
        id
    }

    /// Normalizes a predicate value into an array of value objects,
    /// hoisting embedded nodes as it goes.
    fn normalize_values(&mut self, value: &Value, out: &mut Vec<JsonNode>) -> Vec<Value> {
        match value {
            Value::Array(members) => members
                .iter()
                .flat_map(|member| self.normalize_values(member, out))
                .collect(),
            Value::Object(object) => {
                if is_value_object(object) || is_reference_object(object) {
                    vec![Value::Object(object.clone())]
                } else if is_node_like(object) {
                    let id = self.flatten_node(object, out);
                    vec![serde_json::json!({"@id": id})]
                } else {
                    // An object with neither keywords nor predicates carries
                    // no information.
                    Vec::new()
                }
            }
            Value::Null => Vec::new(),
            scalar => vec![serde_json::json!({"@value": scalar})],
        }
    }

    fn fresh_blank_id(&mut self) -> String {
        loop {
            let candidate = format!("_:b{}", self.blank_counter);
            self.blank_counter += 1;
            if self.used_ids.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

fn collect_ids(value: &Value, ids: &mut HashSet<String>) {
    match value {
        Value::Array(members) => {
            for member in members {
                collect_ids(member, ids);
            }
        }
        Value::Object(object) => {
            if let Some(id) = object.get("@id").and_then(Value::as_str) {
                ids.insert(id.to_owned());
            }
            for value in object.values() {
                collect_ids(value, ids);
            }
        }
        _ => {}
    }
}
