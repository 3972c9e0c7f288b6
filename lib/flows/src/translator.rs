use crate::values::encode_property;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use urdf_store::vocab::{nrua, schema};
use urdf_store::{jsonld, JsonNode, StoreError};

/// Configuration keys that never reach the application graph: positional
/// editor state, wiring (captured as NodeOutput resources), and the
/// non-semantic editor keys. `name` is captured separately as
/// `schema:name`.
const EXCLUDED_KEYS: &[&str] = &[
    "id", "type", "z", "x", "y", "wires", "info", "d", "g", "label", "disabled", "env", "name",
];

/// Keys under which a flow export may nest its node list.
const NODE_LIST_KEYS: &[&str] = &["flows", "nodes", "data", "items", "content"];

/// Extracts the node list from the common flow-export shapes: either a
/// plain array of nodes or an object wrapping one.
pub fn extract_nodes(doc: &Value) -> Vec<Map<String, Value>> {
    match doc {
        Value::Array(members) => members
            .iter()
            .filter_map(Value::as_object)
            .cloned()
            .collect(),
        Value::Object(object) => NODE_LIST_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array))
            .map(|members| {
                members
                    .iter()
                    .filter_map(Value::as_object)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Maps a flow configuration onto the application graph.
///
/// Identifiers are stable under re-runs with identical input:
///
/// - application `urn:nrua:a<instance>`
/// - flow `urn:nrua:f<tabId>`
/// - node `urn:nrua:n<nodeId>`
/// - output `urn:nrua:o<nodeId><gateIndex>`
/// - auxiliary values: parent id plus URN-safe encoded key parts
pub struct Translator {
    instance: String,
}

impl Translator {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// The stable IRI of the application root node.
    pub fn application_iri(&self) -> String {
        format!("urn:nrua:a{}", self.instance)
    }

    /// Produces the application graph dataset for `gid`.
    ///
    /// The emitted dataset is checked against the array-valued predicate
    /// contract before it is handed back; a violation means a bug in the
    /// builder and must never reach the store.
    pub fn translate(
        &self,
        nodes: &[Map<String, Value>],
        gid: &str,
    ) -> Result<Value, StoreError> {
        let mut graph: Vec<JsonNode> = Vec::new();
        let app_id = self.application_iri();

        let mut app = entity_node(&app_id, nrua::APPLICATION);
        app.insert(
            schema::NAME.to_owned(),
            serde_json::json!([{ "@value": self.instance }]),
        );
        app.insert(
            schema::IDENTIFIER.to_owned(),
            serde_json::json!([{ "@value": self.instance }]),
        );
        graph.push(app);

        // Tabs first: flows must exist before nodes aggregate keywords
        // into them.
        let mut keywords: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut flow_slots: BTreeMap<String, usize> = BTreeMap::new();
        for node in nodes {
            if node_type(node) != Some("tab") {
                continue;
            }
            let Some(tab_id) = node_id(node) else {
                continue;
            };
            let mut flow = entity_node(&format!("urn:nrua:f{tab_id}"), nrua::FLOW);
            if let Some(name) = node
                .get("label")
                .and_then(Value::as_str)
                .or_else(|| node.get("name").and_then(Value::as_str))
            {
                flow.insert(
                    schema::NAME.to_owned(),
                    serde_json::json!([{ "@value": name }]),
                );
            }
            flow.insert(
                schema::IDENTIFIER.to_owned(),
                serde_json::json!([{ "@value": tab_id }]),
            );
            flow.insert(
                schema::IS_PART_OF.to_owned(),
                serde_json::json!([{ "@id": app_id }]),
            );
            flow_slots.insert(tab_id.to_owned(), graph.len());
            keywords.insert(tab_id.to_owned(), BTreeSet::new());
            graph.push(flow);
        }

        for node in nodes {
            let kind = node_type(node);
            if kind == Some("tab") {
                continue;
            }
            let Some(id) = node_id(node) else {
                continue;
            };
            self.translate_node(node, id, kind, &app_id, &mut keywords, &mut graph);
        }

        // Keyword finalization: trimmed, sorted ascending, comma-joined.
        for (tab_id, set) in &keywords {
            let joined = set.iter().cloned().collect::<Vec<_>>().join(",");
            if let Some(slot) = flow_slots.get(tab_id) {
                graph[*slot].insert(
                    schema::KEYWORDS.to_owned(),
                    serde_json::json!([{ "@value": joined }]),
                );
            }
        }

        jsonld::ensure_array_valued(&graph)?;
        Ok(serde_json::json!([{ "@id": gid, "@graph": graph }]))
    }

    fn translate_node(
        &self,
        node: &Map<String, Value>,
        id: &str,
        kind: Option<&str>,
        app_id: &str,
        keywords: &mut BTreeMap<String, BTreeSet<String>>,
        graph: &mut Vec<JsonNode>,
    ) {
        let node_iri = format!("urn:nrua:n{id}");
        let mut entity = entity_node(&node_iri, nrua::NODE);

        if let Some(kind) = kind {
            entity.insert(
                schema::ADDITIONAL_TYPE.to_owned(),
                serde_json::json!([{ "@value": kind }]),
            );
        }
        if let Some(name) = node.get("name").and_then(Value::as_str) {
            entity.insert(
                schema::NAME.to_owned(),
                serde_json::json!([{ "@value": name }]),
            );
        }

        // Containment: nodes inside a flow are parts of it; nodes without
        // one (configuration nodes) are members of the application.
        match node.get("z").and_then(Value::as_str).filter(|z| !z.is_empty()) {
            Some(tab_id) => {
                entity.insert(
                    schema::IS_PART_OF.to_owned(),
                    serde_json::json!([{ "@id": format!("urn:nrua:f{tab_id}") }]),
                );
                if let (Some(set), Some(kind)) = (keywords.get_mut(tab_id), kind) {
                    let trimmed = kind.trim();
                    if !trimmed.is_empty() {
                        set.insert(trimmed.to_owned());
                    }
                }
            }
            None => {
                entity.insert(
                    schema::MEMBER_OF.to_owned(),
                    serde_json::json!([{ "@id": app_id }]),
                );
            }
        }

        let mut properties = Vec::new();
        for (key, value) in node {
            if EXCLUDED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let property_id = encode_property(graph, &node_iri, key, value);
            properties.push(serde_json::json!({ "@id": property_id }));
        }
        if !properties.is_empty() {
            entity.insert(
                schema::ADDITIONAL_PROPERTY.to_owned(),
                Value::Array(properties),
            );
        }

        if let Some(wires) = node.get("wires").and_then(Value::as_array) {
            let mut outputs = Vec::new();
            for (gate, targets) in wires.iter().enumerate() {
                let targets: Vec<&str> = targets
                    .as_array()
                    .map(|members| {
                        members.iter().filter_map(Value::as_str).collect()
                    })
                    .unwrap_or_default();
                if targets.is_empty() {
                    continue;
                }
                let output_iri = format!("urn:nrua:o{id}{gate}");
                let mut output = entity_node(&output_iri, nrua::NODE_OUTPUT);
                output.insert(
                    schema::POSITION.to_owned(),
                    serde_json::json!([{ "@value": gate }]),
                );
                output.insert(
                    nrua::TARGET.to_owned(),
                    Value::Array(
                        targets
                            .iter()
                            .map(|target| {
                                serde_json::json!({ "@id": format!("urn:nrua:n{target}") })
                            })
                            .collect(),
                    ),
                );
                graph.push(output);
                outputs.push(serde_json::json!({ "@id": output_iri }));
            }
            if !outputs.is_empty() {
                entity.insert(schema::HAS_PART.to_owned(), Value::Array(outputs));
            }
        }

        graph.push(entity);
    }
}

fn entity_node(id: &str, class: &str) -> JsonNode {
    let mut node = JsonNode::new();
    node.insert("@id".to_owned(), Value::from(id));
    node.insert("@type".to_owned(), serde_json::json!([class]));
    node
}

fn node_id(node: &Map<String, Value>) -> Option<&str> {
    node.get("id").and_then(Value::as_str).filter(|id| !id.is_empty())
}

fn node_type(node: &Map<String, Value>) -> Option<&str> {
    node.get("type").and_then(Value::as_str)
}
