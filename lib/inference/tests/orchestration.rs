//! End-to-end orchestration over a real store and evaluator: SPARQL and
//! N3 rules side by side, helper-predicate filtering, and the
//! replace-not-patch discipline on the inferred graph.

use serde_json::json;
use std::sync::{Arc, Mutex};
use urdf_inference::{DerivedFact, N3Reasoner, Orchestrator, ReasonerError};
use urdf_sparql::{OxigraphEvaluator, SparqlGateway};
use urdf_store::vocab::nrua;
use urdf_store::{Dictionary, QuadStore};

const RULES_GID: &str = "urn:graph:rules";
const INFERRED_GID: &str = "urn:graph:inferred";

fn store() -> QuadStore {
    let dictionary = Dictionary::from_iris(
        [
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
            "https://schema.org/name",
            "https://schema.org/text",
            "https://schema.org/programmingLanguage",
        ]
        .map(String::from),
    );
    let mut store = QuadStore::new(Arc::new(dictionary), "urn:graph:default");
    store
        .load(&json!([{
            "@id": "urn:graph:app",
            "@graph": [
                {
                    "@id": "urn:nrua:nA",
                    "@type": [nrua::NODE],
                    "https://schema.org/name": [{"@value": "tick"}],
                },
                {
                    "@id": "urn:nrua:nB",
                    "@type": [nrua::NODE],
                    "https://schema.org/name": [{"@value": "tock"}],
                },
            ],
        }]))
        .unwrap();
    store
}

fn load_rules(store: &mut QuadStore, rules: serde_json::Value) {
    store
        .load(&json!([{ "@id": RULES_GID, "@graph": rules }]))
        .unwrap();
}

fn sparql_rule() -> serde_json::Value {
    json!({
        "@id": "urn:rule:same-name",
        "@type": [nrua::RULE],
        "https://schema.org/programmingLanguage": [{"@value": "sparql"}],
        "https://schema.org/text": [{"@value":
            "SELECT ?s ?p ?o WHERE { \
                ?s <https://schema.org/name> ?name . \
                BIND(<urn:derived> AS ?p) \
                BIND(CONCAT(\"same-name-\", ?name) AS ?o) \
            }"
        }],
    })
}

fn n3_rule() -> serde_json::Value {
    json!([
        {
            "@id": "urn:rule:n3",
            "@type": [nrua::RULE],
            "https://schema.org/programmingLanguage": [{"@value": "n3"}],
            "https://schema.org/text": [{"@value": "{ ?n ?p ?v } => { ?n ?p ?v } ."}],
            "https://schema.org/hasPart": [{"@id": "urn:rule:n3:projection"}],
        },
        {
            "@id": "urn:rule:n3:projection",
            "@type": ["https://schema.org/SoftwareSourceCode"],
            "https://schema.org/text": [{"@value":
                "SELECT ?s ?p ?o WHERE { \
                    ?s <https://schema.org/name> ?o . \
                    BIND(<urn:nrua:pv:name> AS ?p) \
                }"
            }],
        },
    ])
}

/// A scripted reasoner: records the program it was handed and replays a
/// fixed derivation set.
struct ScriptedReasoner {
    programs: Mutex<Vec<String>>,
    derivations: Vec<DerivedFact>,
}

impl ScriptedReasoner {
    fn new(derivations: Vec<DerivedFact>) -> Self {
        Self {
            programs: Mutex::new(Vec::new()),
            derivations,
        }
    }
}

impl N3Reasoner for ScriptedReasoner {
    fn reason(
        &self,
        program: &str,
        on_derived: &mut dyn FnMut(DerivedFact),
    ) -> Result<(), ReasonerError> {
        self.programs.lock().unwrap().push(program.to_owned());
        for fact in &self.derivations {
            on_derived(fact.clone());
        }
        Ok(())
    }
}

fn fact(subject: &str, predicate: &str, object: &str) -> DerivedFact {
    DerivedFact {
        subject: subject.to_owned(),
        predicate: predicate.to_owned(),
        object: object.to_owned(),
    }
}

#[test]
fn sparql_rules_populate_the_inferred_graph() {
    let mut store = store();
    load_rules(&mut store, json!([sparql_rule()]));
    let gateway = SparqlGateway::new(Arc::new(OxigraphEvaluator));

    let outcome = Orchestrator::new(None)
        .run(&mut store, &gateway, RULES_GID, INFERRED_GID)
        .unwrap();
    assert_eq!(outcome.rules, 1);
    assert_eq!(outcome.triples, 2);

    let derived = store.find("urn:nrua:nA", Some(INFERRED_GID)).unwrap();
    assert_eq!(
        derived["urn:derived"],
        json!([{"@value": "same-name-tick"}])
    );
}

#[test]
fn n3_rules_receive_projected_facts_and_pv_helpers_never_persist() {
    let mut store = store();
    load_rules(&mut store, n3_rule());

    let reasoner = Arc::new(ScriptedReasoner::new(vec![
        fact("<urn:nrua:nA>", "<urn:derived>", "\"via-n3\""),
        fact("<urn:nrua:nA>", "<urn:nrua:pv:name>", "\"tick\""),
    ]));
    let gateway = SparqlGateway::new(Arc::new(OxigraphEvaluator));

    let outcome = Orchestrator::new(Some(reasoner.clone()))
        .run(&mut store, &gateway, RULES_GID, INFERRED_GID)
        .unwrap();
    assert_eq!(outcome.rules, 1);
    // The pv:-prefixed helper derivation is filtered out.
    assert_eq!(outcome.triples, 1);

    let programs = reasoner.programs.lock().unwrap();
    assert_eq!(programs.len(), 1);
    // Fact base first (both projected bindings), then a blank line, then
    // the rule program.
    assert!(programs[0].contains("<urn:nrua:nA> <urn:nrua:pv:name> \"tick\" ."));
    assert!(programs[0].contains("<urn:nrua:nB> <urn:nrua:pv:name> \"tock\" ."));
    assert!(programs[0].contains("\n\n{ ?n ?p ?v } => { ?n ?p ?v } ."));

    let derived = store.find("urn:nrua:nA", Some(INFERRED_GID)).unwrap();
    assert_eq!(derived["urn:derived"], json!([{"@value": "via-n3"}]));
    assert!(!derived.contains_key("urn:nrua:pv:name"));
}

#[test]
fn missing_reasoner_degrades_to_sparql_only() {
    let mut store = store();
    let mut rules = vec![sparql_rule()];
    rules.extend(n3_rule().as_array().unwrap().clone());
    load_rules(&mut store, json!(rules));

    let gateway = SparqlGateway::new(Arc::new(OxigraphEvaluator));
    let outcome = Orchestrator::new(None)
        .run(&mut store, &gateway, RULES_GID, INFERRED_GID)
        .unwrap();

    // Both rules are counted, but only the SPARQL rule derives.
    assert_eq!(outcome.rules, 2);
    assert_eq!(outcome.triples, 2);
}

#[test]
fn empty_rules_graph_clears_the_inferred_graph() {
    let mut store = store();
    load_rules(&mut store, json!([sparql_rule()]));
    let gateway = SparqlGateway::new(Arc::new(OxigraphEvaluator));
    let orchestrator = Orchestrator::new(None);

    orchestrator
        .run(&mut store, &gateway, RULES_GID, INFERRED_GID)
        .unwrap();
    assert!(store.size(Some(INFERRED_GID)) > 0);

    store.clear(Some(RULES_GID));
    let outcome = orchestrator
        .run(&mut store, &gateway, RULES_GID, INFERRED_GID)
        .unwrap();
    assert_eq!(outcome.rules, 0);
    assert_eq!(store.size(Some(INFERRED_GID)), 0);
}

#[test]
fn failing_rules_are_skipped_not_fatal() {
    let mut store = store();
    load_rules(
        &mut store,
        json!([
            sparql_rule(),
            {
                "@id": "urn:rule:broken",
                "@type": [nrua::RULE],
                "https://schema.org/programmingLanguage": [{"@value": "sparql"}],
                "https://schema.org/text": [{"@value": "SELECT ?s WHERE { this is not sparql"}],
            },
        ]),
    );
    let gateway = SparqlGateway::new(Arc::new(OxigraphEvaluator));

    let outcome = Orchestrator::new(None)
        .run(&mut store, &gateway, RULES_GID, INFERRED_GID)
        .unwrap();
    assert_eq!(outcome.rules, 2);
    assert_eq!(outcome.triples, 2);
}

#[test]
fn reruns_replace_rather_than_accumulate() {
    let mut store = store();
    load_rules(&mut store, json!([sparql_rule()]));
    let gateway = SparqlGateway::new(Arc::new(OxigraphEvaluator));
    let orchestrator = Orchestrator::new(None);

    orchestrator
        .run(&mut store, &gateway, RULES_GID, INFERRED_GID)
        .unwrap();
    let first = store.size(Some(INFERRED_GID));
    orchestrator
        .run(&mut store, &gateway, RULES_GID, INFERRED_GID)
        .unwrap();
    assert_eq!(store.size(Some(INFERRED_GID)), first);
}
