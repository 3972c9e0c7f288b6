//! The evaluation capability consumed by the gateway, and its default
//! oxigraph-backed implementation.

use crate::error::EvaluatorError;
use oxigraph::sparql::{Query, QueryResults};
use oxigraph::store::Store;
use oxrdf::{Literal, NamedNode, Quad, Term};
use std::collections::BTreeMap;
use urdf_store::Dictionary;

/// One solution row: variable name to bound term.
pub type Binding = BTreeMap<String, Term>;

/// The outcome of evaluating a query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// An ASK answer.
    Boolean(bool),
    /// SELECT bindings (or CONSTRUCT triples projected onto `s`/`p`/`o`).
    Solutions(Vec<Binding>),
}

/// A black-box SPARQL engine.
///
/// The evaluator receives the store's current dataset in token form
/// together with an already rewritten query, and is free to index it
/// however it likes. Implementations must treat the dataset as the
/// complete source of truth for the call; nothing is cached between
/// calls.
pub trait SparqlEvaluator: Send + Sync {
    /// Evaluates `query` against `dataset`.
    fn evaluate(&self, dataset: &[Quad], query: &str) -> Result<QueryOutcome, EvaluatorError>;
}

/// Expands a term out of token form: named nodes that are `z:<n>` tokens
/// and literal datatypes in token form are rewritten to their IRIs.
pub fn expand_term(dictionary: &Dictionary, term: &Term) -> Term {
    match term {
        Term::NamedNode(node) => expand_named_node(dictionary, node).into(),
        Term::Literal(literal) => {
            let datatype = literal.datatype();
            let expanded = dictionary.expand(datatype.as_str());
            if expanded == datatype.as_str() || literal.language().is_some() {
                term.clone()
            } else {
                Literal::new_typed_literal(literal.value(), NamedNode::new_unchecked(expanded))
                    .into()
            }
        }
        other => other.clone(),
    }
}

/// Expands a named node out of token form.
pub fn expand_named_node(dictionary: &Dictionary, node: &NamedNode) -> NamedNode {
    let expanded = dictionary.expand(node.as_str());
    if expanded == node.as_str() {
        node.clone()
    } else {
        NamedNode::new_unchecked(expanded)
    }
}

/// Evaluates queries by loading the dataset into a fresh oxigraph store
/// per call. Queries see the union of all named graphs as the default
/// graph, so rules can address the dataset without `GRAPH` clauses.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxigraphEvaluator;

impl SparqlEvaluator for OxigraphEvaluator {
    fn evaluate(&self, dataset: &[Quad], query: &str) -> Result<QueryOutcome, EvaluatorError> {
        let store = Store::new()
            .map_err(|e| EvaluatorError::Evaluation(format!("store setup failed: {e}")))?;
        for quad in dataset {
            store
                .insert(quad.as_ref())
                .map_err(|e| EvaluatorError::Evaluation(format!("dataset load failed: {e}")))?;
        }

        let mut query = Query::parse(query, None)
            .map_err(|e| EvaluatorError::Evaluation(format!("parse error: {e}")))?;
        query.dataset_mut().set_default_graph_as_union();

        let results = store
            .query(query)
            .map_err(|e| EvaluatorError::from_evaluator_message(e.to_string()))?;

        match results {
            QueryResults::Boolean(answer) => Ok(QueryOutcome::Boolean(answer)),
            QueryResults::Solutions(solutions) => {
                let mut bindings = Vec::new();
                for solution in solutions {
                    let solution = solution
                        .map_err(|e| EvaluatorError::from_evaluator_message(e.to_string()))?;
                    let row: Binding = solution
                        .iter()
                        .map(|(variable, term)| (variable.as_str().to_owned(), term.clone()))
                        .collect();
                    bindings.push(row);
                }
                Ok(QueryOutcome::Solutions(bindings))
            }
            // CONSTRUCT/DESCRIBE triples are projected onto s/p/o rows so
            // rule execution can treat every query shape alike.
            QueryResults::Graph(triples) => {
                let mut bindings = Vec::new();
                for triple in triples {
                    let triple = triple
                        .map_err(|e| EvaluatorError::from_evaluator_message(e.to_string()))?;
                    let mut row = Binding::new();
                    row.insert("s".to_owned(), triple.subject.into());
                    row.insert("p".to_owned(), triple.predicate.into());
                    row.insert("o".to_owned(), triple.object);
                    bindings.push(row);
                }
                Ok(QueryOutcome::Solutions(bindings))
            }
        }
    }
}
