//! Translator determinism over generated flow configurations.

use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::{json, Value};
use urdf_flows::{extract_nodes, Translator};
use urdf_store::jsonld;

fn config_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z0-9 ]{0,10}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        vec("[a-z]{1,6}".prop_map(Value::from), 0..4).prop_map(Value::from),
    ]
}

fn flow_node() -> impl Strategy<Value = Value> {
    (
        "[a-f0-9]{6}",
        "[a-z]{3,8}",
        proptest::option::of("[a-f0-9]{6}"),
        vec(("[a-z]{1,8}", config_value()), 0..4),
        vec(vec("[a-f0-9]{6}", 0..3), 0..3),
    )
        .prop_map(|(id, kind, z, keys, wires)| {
            let mut node = serde_json::Map::new();
            node.insert("id".to_owned(), json!(id));
            node.insert("type".to_owned(), json!(kind));
            if let Some(z) = z {
                node.insert("z".to_owned(), json!(z));
            }
            for (key, value) in keys {
                node.insert(key, value);
            }
            node.insert("wires".to_owned(), json!(wires));
            Value::Object(node)
        })
}

proptest! {
    /// Two runs over byte-identical input emit identical datasets, and
    /// the output always satisfies the array-valued predicate contract.
    #[test]
    fn translation_is_deterministic(
        tabs in vec("[a-f0-9]{6}", 0..3),
        nodes in vec(flow_node(), 0..12),
    ) {
        let mut config: Vec<Value> = tabs
            .iter()
            .map(|id| json!({"id": id, "type": "tab", "label": format!("Flow {id}")}))
            .collect();
        config.extend(nodes);
        let config = Value::Array(config);

        let extracted = extract_nodes(&config);
        let translator = Translator::new("prop");
        let first = translator.translate(&extracted, "urn:graph:app").unwrap();
        let second = translator.translate(&extracted, "urn:graph:app").unwrap();
        prop_assert_eq!(&first, &second);

        let graph: Vec<_> = first[0]["@graph"]
            .as_array()
            .unwrap()
            .iter()
            .map(|node| node.as_object().cloned().unwrap())
            .collect();
        jsonld::ensure_array_valued(&graph).unwrap();
    }
}
