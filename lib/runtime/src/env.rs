//! The environment graph: a one-shot snapshot of the host's settings and
//! diagnostics, written once after the admin surface becomes reachable
//! and never mutated afterwards.

use serde_json::Value;
use urdf_flows::encode_property;
use urdf_store::vocab::{nrua, schema};
use urdf_store::JsonNode;

/// Builds the environment dataset for `gid` out of the host's
/// `/settings` and `/diagnostics` answers, encoded through the same
/// recursive property encoder the translator uses.
pub fn environment_dataset(
    instance: &str,
    settings: &Value,
    diagnostics: &Value,
    gid: &str,
) -> Value {
    let root_id = format!("urn:nrua:e{instance}");
    let mut graph: Vec<JsonNode> = Vec::new();

    let mut root = JsonNode::new();
    root.insert("@id".to_owned(), Value::from(root_id.clone()));
    root.insert("@type".to_owned(), serde_json::json!([nrua::ENVIRONMENT]));
    root.insert(
        schema::NAME.to_owned(),
        serde_json::json!([{ "@value": instance }]),
    );

    let mut properties = Vec::new();
    for (key, doc) in [("settings", settings), ("diagnostics", diagnostics)] {
        let id = encode_property(&mut graph, &root_id, key, doc);
        properties.push(serde_json::json!({ "@id": id }));
    }
    root.insert(
        schema::ADDITIONAL_PROPERTY.to_owned(),
        Value::Array(properties),
    );
    graph.push(root);

    serde_json::json!([{ "@id": gid, "@graph": graph }])
}
