//! Whole-pipeline test through the umbrella crate: flow event → debounced
//! application rebuild → inference → query over the inferred graph.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use urdf::runtime::host::HostError;
use urdf::runtime::{Config, FlowsSource, Runtime};
use urdf::sparql::{OxigraphEvaluator, QueryResponse};

struct StaticFlows(Value);

#[async_trait]
impl FlowsSource for StaticFlows {
    async fn fetch_flows(&self) -> Result<Value, HostError> {
        Ok(self.0.clone())
    }
}

#[tokio::test(start_paused = true)]
async fn flow_event_to_inferred_answer() {
    let config = Config {
        zurl_path: "../../data/zurl.json".to_owned(),
        ontology_path: "../../data/ontology.jsonld".to_owned(),
        rules_path: "../../data/rules.jsonld".to_owned(),
        instance: "e2e".to_owned(),
        ..Config::default()
    };

    let flows = json!([
        {"id": "t1", "type": "tab", "label": "Main"},
        {"id": "n1", "type": "inject", "z": "t1", "name": "tick", "wires": [["n2"]]},
        {"id": "n2", "type": "debug", "z": "t1", "wires": []},
    ]);
    let handle = Runtime::start(
        config,
        Arc::new(OxigraphEvaluator),
        None,
        Some(Arc::new(StaticFlows(flows))),
    )
    .await;
    let mut events = handle.events().subscribe();

    handle.notify_flows("flows:started").await;
    tokio::time::advance(Duration::from_millis(300)).await;
    loop {
        let event = events.recv().await.unwrap();
        if event.kind == "inference" {
            assert_eq!(event.response["ok"], true);
            break;
        }
    }

    // The shipped default rules derive application membership for every
    // node inside a flow.
    let answer = handle
        .query(
            "SELECT ?node WHERE { \
                ?node <https://schema.org/memberOf> <urn:nrua:ae2e> . \
                ?node <https://schema.org/additionalType> ?kind . \
            }"
            .to_owned(),
        )
        .await
        .unwrap();
    let QueryResponse::Select(rows) = answer else {
        panic!("expected SELECT");
    };
    let mut nodes: Vec<&str> = rows
        .iter()
        .map(|row| row["node"]["value"].as_str().unwrap())
        .collect();
    nodes.sort_unstable();
    assert_eq!(nodes, ["urn:nrua:nn1", "urn:nrua:nn2"]);

    // The keyword roll-up lands on the application node in the inferred
    // graph, expanded on egress.
    let app = handle
        .node(
            "urn:nrua:ae2e".to_owned(),
            Some("urn:graph:inferred".to_owned()),
        )
        .await
        .unwrap();
    assert_eq!(
        app["https://schema.org/keywords"],
        json!([{"@value": "debug,inject"}])
    );
}
