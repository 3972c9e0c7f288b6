use crate::error::EvaluatorError;
use crate::evaluator::{expand_term, Binding, QueryOutcome, SparqlEvaluator};
use crate::results::binding_to_json;
use crate::rewrite::{ensure_no_prologue, rewrite_query};
use serde_json::{Map, Value};
use std::sync::Arc;
use urdf_store::{quads, QuadStore};

/// The expanded answer of a store query, ready for the HTTP façade.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// An ASK answer.
    Ask(bool),
    /// SELECT rows, each a variable-to-term JSON object.
    Select(Vec<Map<String, Value>>),
}

impl QueryResponse {
    /// The wire name of the answer shape.
    pub fn type_name(&self) -> &'static str {
        match self {
            QueryResponse::Ask(_) => "ASK",
            QueryResponse::Select(_) => "SELECT",
        }
    }
}

/// Front door for SPARQL over the store.
///
/// Rewrites queries into token form, materializes the store as a quad
/// dataset, delegates to the injected [`SparqlEvaluator`], and expands
/// the answer before it leaves the core.
pub struct SparqlGateway {
    evaluator: Arc<dyn SparqlEvaluator>,
}

impl SparqlGateway {
    pub fn new(evaluator: Arc<dyn SparqlEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Runs a query for an external caller, answering expanded JSON.
    pub fn query(&self, store: &QuadStore, text: &str) -> Result<QueryResponse, EvaluatorError> {
        let dictionary = Arc::clone(store.dictionary());
        match self.evaluate(store, text)? {
            QueryOutcome::Boolean(answer) => Ok(QueryResponse::Ask(answer)),
            QueryOutcome::Solutions(bindings) => Ok(QueryResponse::Select(
                bindings
                    .iter()
                    .map(|binding| binding_to_json(&dictionary, binding))
                    .collect(),
            )),
        }
    }

    /// Runs a query for the inference loop, answering term bindings with
    /// every token expanded.
    pub fn project(&self, store: &QuadStore, text: &str) -> Result<Vec<Binding>, EvaluatorError> {
        let dictionary = Arc::clone(store.dictionary());
        match self.evaluate(store, text)? {
            QueryOutcome::Boolean(_) => Ok(Vec::new()),
            QueryOutcome::Solutions(bindings) => Ok(bindings
                .into_iter()
                .map(|binding| {
                    binding
                        .into_iter()
                        .map(|(variable, term)| (variable, expand_term(&dictionary, &term)))
                        .collect()
                })
                .collect()),
        }
    }

    fn evaluate(&self, store: &QuadStore, text: &str) -> Result<QueryOutcome, EvaluatorError> {
        ensure_no_prologue(text)?;
        let rewritten = rewrite_query(store.dictionary(), text);
        let dataset = quads::dataset_quads(store)?;
        self.evaluator.evaluate(&dataset, &rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::OxigraphEvaluator;
    use serde_json::json;
    use urdf_store::Dictionary;

    fn gateway() -> SparqlGateway {
        SparqlGateway::new(Arc::new(OxigraphEvaluator))
    }

    fn store() -> QuadStore {
        let dictionary = Dictionary::from_iris(
            [
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
                "https://schema.org/name",
            ]
            .map(String::from),
        );
        let mut store = QuadStore::new(Arc::new(dictionary), "urn:graph:default");
        store
            .load(&json!([{
                "@id": "urn:graph:test",
                "@graph": [{
                    "@id": "urn:x",
                    "@type": ["urn:C"],
                    "https://schema.org/name": [{"@value": "N"}],
                }],
            }]))
            .unwrap();
        store
    }

    #[test]
    fn select_round_trips_compression() {
        let response = gateway()
            .query(
                &store(),
                "SELECT ?p ?o WHERE { <urn:x> ?p ?o FILTER(isLiteral(?o)) }",
            )
            .unwrap();
        let QueryResponse::Select(rows) = response else {
            panic!("expected SELECT");
        };
        assert_eq!(rows.len(), 1);
        // The binding is expanded back to the full predicate IRI.
        assert_eq!(rows[0]["p"]["value"], "https://schema.org/name");
        assert_eq!(rows[0]["o"]["value"], "N");
    }

    #[test]
    fn type_queries_use_the_bare_keyword() {
        let response = gateway()
            .query(
                &store(),
                "ASK { <urn:x> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <urn:C> }",
            )
            .unwrap();
        assert_eq!(response, QueryResponse::Ask(true));
    }

    #[test]
    fn prologue_is_a_contract_violation() {
        let err = gateway()
            .query(&store(), "PREFIX s: <urn:s> SELECT ?s WHERE { ?s ?p ?o }")
            .unwrap_err();
        assert!(matches!(err, EvaluatorError::ContractViolation(_)));
    }

    #[test]
    fn project_expands_terms() {
        let bindings = gateway()
            .project(&store(), "SELECT ?s ?p ?o WHERE { ?s ?p ?o FILTER(isLiteral(?o)) }")
            .unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(
            bindings[0]["p"],
            oxrdf::Term::from(oxrdf::NamedNode::new_unchecked("https://schema.org/name"))
        );
    }
}
