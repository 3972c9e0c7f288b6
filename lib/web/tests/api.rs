//! Integration tests for the `/urdf` HTTP façade, driven through
//! axum-test without a real socket.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use urdf_runtime::{Config, Runtime};
use urdf_sparql::OxigraphEvaluator;

async fn test_server() -> TestServer {
    let config = Config {
        zurl_path: "does-not-exist/zurl.json".to_owned(),
        ontology_path: "does-not-exist/ontology.jsonld".to_owned(),
        rules_path: "does-not-exist/rules.jsonld".to_owned(),
        instance: "test".to_owned(),
        ..Config::default()
    };
    let handle = Runtime::start(config, Arc::new(OxigraphEvaluator), None, None).await;
    TestServer::new(urdf_web::router(handle)).unwrap()
}

fn sample_dataset() -> Value {
    json!([{
        "@id": "urn:graph:test",
        "@graph": [{
            "@id": "urn:x",
            "@type": ["urn:C"],
            "urn:p": [{"@value": "v"}],
        }],
    }])
}

#[tokio::test]
async fn health_reports_ok_and_size() {
    let server = test_server().await;
    let response = server.get("/urdf/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["size"], 0);
    assert!(body["ts"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn load_then_read_back() {
    let server = test_server().await;

    let response = server.post("/urdf/load").json(&sample_dataset()).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["size"], 2);

    let response = server
        .get("/urdf/graph")
        .add_query_param("gid", "urn:graph:test")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["gid"], "urn:graph:test");
    assert_eq!(body["graph"].as_array().unwrap().len(), 1);

    let response = server
        .get("/urdf/node")
        .add_query_param("id", "urn:x")
        .add_query_param("gid", "urn:graph:test")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["node"]["urn:p"], json!([{"@value": "v"}]));

    let response = server
        .get("/urdf/size")
        .add_query_param("gid", "urn:graph:test")
        .await;
    let body: Value = response.json();
    assert_eq!(body["size"], 2);

    let response = server.get("/urdf/size").await;
    let body: Value = response.json();
    assert_eq!(body["totalSize"], 2);
}

#[tokio::test]
async fn unknown_graph_and_node_answer_404() {
    let server = test_server().await;
    server
        .get("/urdf/graph")
        .add_query_param("gid", "urn:graph:missing")
        .await
        .assert_status_not_found();
    server
        .get("/urdf/node")
        .add_query_param("id", "urn:missing")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn load_file_requires_an_id() {
    let server = test_server().await;

    let response = server
        .post("/urdf/loadFile")
        .json(&json!({"doc": {"@graph": []}}))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["kind"], "ContractViolation");

    // The store is unchanged.
    let health: Value = server.get("/urdf/health").await.json();
    assert_eq!(health["size"], 0);

    let response = server
        .post("/urdf/loadFile")
        .json(&json!({"doc": sample_dataset()}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["gid"], "urn:graph:test");
    assert_eq!(body["size"], 2);
    assert_eq!(body["totalSize"], 2);
}

#[tokio::test]
async fn query_answers_ask_and_select() {
    let server = test_server().await;
    server.post("/urdf/load").json(&sample_dataset()).await;

    let response = server
        .post("/urdf/query")
        .json(&json!({"sparql": "ASK { <urn:x> a <urn:C> }"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["type"], "ASK");
    assert_eq!(body["result"], true);

    let response = server
        .post("/urdf/query")
        .json(&json!({"sparql": "SELECT ?o WHERE { <urn:x> <urn:p> ?o }"}))
        .await;
    let body: Value = response.json();
    assert_eq!(body["type"], "SELECT");
    assert_eq!(body["results"][0]["o"]["value"], "v");
}

#[tokio::test]
async fn prologue_queries_are_rejected() {
    let server = test_server().await;
    let response = server
        .post("/urdf/query")
        .json(&json!({"sparql": "PREFIX s: <urn:s/> SELECT ?x WHERE { ?x s:p ?o }"}))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["kind"], "ContractViolation");
}

#[tokio::test]
async fn clear_scopes_to_the_given_graph() {
    let server = test_server().await;
    server.post("/urdf/load").json(&sample_dataset()).await;

    let response = server
        .post("/urdf/clear")
        .json(&json!({"gid": "urn:graph:test"}))
        .await;
    response.assert_status_ok();

    let health: Value = server.get("/urdf/health").await.json();
    assert_eq!(health["size"], 0);
}

#[tokio::test]
async fn export_answers_an_attachment() {
    let server = test_server().await;
    server.post("/urdf/load").json(&sample_dataset()).await;

    let response = server
        .get("/urdf/export")
        .add_query_param("gid", "urn:graph:test")
        .await;
    response.assert_status_ok();
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment"));
    let body: Value = response.json();
    assert_eq!(body[0]["@id"], "urn:graph:test");
}

#[tokio::test]
async fn rules_crud_answers_the_documented_statuses() {
    let server = test_server().await;
    let rule = json!({"rule": {
        "@id": "urn:rule:1",
        "https://schema.org/programmingLanguage": "sparql",
        "https://schema.org/text": "SELECT ?s ?p ?o WHERE { ?s ?p ?o }",
    }});

    server.post("/urdf/rules/create").json(&rule).await.assert_status_ok();
    server
        .post("/urdf/rules/create")
        .json(&rule)
        .await
        .assert_status(axum::http::StatusCode::CONFLICT);

    let unknown = json!({"rule": {
        "@id": "urn:rule:ghost",
        "https://schema.org/text": "SELECT ?s ?p ?o WHERE { ?s ?p ?o }",
    }});
    server
        .post("/urdf/rules/update")
        .json(&unknown)
        .await
        .assert_status_not_found();

    let incomplete = json!({"rule": {"@id": "urn:rule:incomplete"}});
    server
        .post("/urdf/rules/create")
        .json(&incomplete)
        .await
        .assert_status_bad_request();

    server
        .post("/urdf/rules/delete")
        .json(&json!({"id": "urn:rule:1"}))
        .await
        .assert_status_ok();
    server
        .post("/urdf/rules/delete")
        .json(&json!({"id": "urn:rule:1"}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn zurl_serves_the_dictionary_array() {
    let server = test_server().await;
    let response = server.get("/urdf/zurl").await;
    response.assert_status_ok();
    // No dictionary file in the test environment: the array is empty but
    // well-formed.
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());
}
