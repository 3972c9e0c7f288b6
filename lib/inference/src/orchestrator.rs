use crate::error::InferenceError;
use crate::projection::{decode_fact, ntriples_line, triple_from_binding, DerivedTriple};
use crate::reasoner::N3Reasoner;
use crate::rules::{rules_from_graph, Rule, RuleLanguage};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use urdf_sparql::SparqlGateway;
use urdf_store::vocab::{nrua, rdf};
use urdf_store::{JsonNode, QuadStore, StoreError};

/// Summary of one inference cycle, reported on the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceOutcome {
    /// Number of rules found in the rules graph.
    pub rules: usize,
    /// Number of derived triples that survived the helper-predicate
    /// filter.
    pub triples: usize,
}

/// Executes the rules graph and rebuilds the inferred graph.
///
/// The inferred graph is always replaced wholesale (clear + load), never
/// patched.
pub struct Orchestrator {
    reasoner: Option<Arc<dyn N3Reasoner>>,
}

impl Orchestrator {
    pub fn new(reasoner: Option<Arc<dyn N3Reasoner>>) -> Self {
        Self { reasoner }
    }

    /// Whether the N3 capability is present ("SPARQL-only mode" when not).
    pub fn has_reasoner(&self) -> bool {
        self.reasoner.is_some()
    }

    /// Runs one inference cycle.
    ///
    /// Per-rule failures are logged and skipped. The call fails only when
    /// the final graph replacement fails, in which case the inferred
    /// graph is not left partially populated.
    pub fn run(
        &self,
        store: &mut QuadStore,
        gateway: &SparqlGateway,
        rules_gid: &str,
        inferred_gid: &str,
    ) -> Result<InferenceOutcome, InferenceError> {
        let rule_nodes = match store.find_graph(Some(rules_gid)) {
            Ok(nodes) => nodes,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(error) => return Err(error.into()),
        };
        let rules = rules_from_graph(&rule_nodes);
        if rules.is_empty() {
            store.clear(Some(inferred_gid));
            return Ok(InferenceOutcome {
                rules: 0,
                triples: 0,
            });
        }

        let mut derived = Vec::new();
        let mut reasoner_missing_reported = false;
        for rule in &rules {
            match rule.language {
                RuleLanguage::Sparql => self.run_sparql_rule(store, gateway, rule, &mut derived),
                RuleLanguage::N3 => {
                    if self.reasoner.is_none() {
                        if !reasoner_missing_reported {
                            tracing::warn!(
                                "no N3 reasoner capability available, skipping N3 rules"
                            );
                            reasoner_missing_reported = true;
                        }
                        continue;
                    }
                    self.run_n3_rule(store, gateway, rule, &mut derived);
                }
            }
        }

        // Helper predicates emitted during reasoning never persist.
        derived.retain(|triple| !triple.predicate.starts_with(nrua::PV_PREFIX));
        let triples = derived.len();

        store.replace(inferred_gid, aggregate(derived))?;
        Ok(InferenceOutcome {
            rules: rules.len(),
            triples,
        })
    }

    fn run_sparql_rule(
        &self,
        store: &QuadStore,
        gateway: &SparqlGateway,
        rule: &Rule,
        derived: &mut Vec<DerivedTriple>,
    ) {
        match gateway.project(store, &rule.text) {
            Ok(bindings) => {
                for binding in &bindings {
                    match triple_from_binding(binding) {
                        Some(triple) => derived.push(triple),
                        None => tracing::debug!(rule = %rule.id, "binding without s/p/o shape"),
                    }
                }
            }
            Err(error) => {
                tracing::warn!(rule = %rule.id, %error, "SPARQL rule failed, skipping");
            }
        }
    }

    fn run_n3_rule(
        &self,
        store: &QuadStore,
        gateway: &SparqlGateway,
        rule: &Rule,
        derived: &mut Vec<DerivedTriple>,
    ) {
        let Some(reasoner) = &self.reasoner else {
            return;
        };
        let Some(projection) = &rule.projection else {
            tracing::warn!(rule = %rule.id, "N3 rule has no projection query, skipping");
            return;
        };

        let bindings = match gateway.project(store, projection) {
            Ok(bindings) => bindings,
            Err(error) => {
                tracing::warn!(rule = %rule.id, %error, "projection query failed, skipping rule");
                return;
            }
        };

        let mut facts = String::new();
        for binding in &bindings {
            match ntriples_line(binding) {
                Some(line) => {
                    facts.push_str(&line);
                    facts.push('\n');
                }
                None => {
                    tracing::warn!(rule = %rule.id, "projection binding not serializable, skipped");
                }
            }
        }

        // Fact base, a blank line, then the rule program.
        let program = format!("{facts}\n{}", rule.text);
        let mut collected = Vec::new();
        match reasoner.reason(&program, &mut |fact| collected.push(fact)) {
            Ok(()) => {
                for fact in &collected {
                    match decode_fact(fact) {
                        Some(triple) => derived.push(triple),
                        None => tracing::debug!(rule = %rule.id, ?fact, "undecodable derivation"),
                    }
                }
            }
            Err(error) => {
                tracing::warn!(rule = %rule.id, %error, "reasoner failed, skipping rule");
            }
        }
    }
}

/// Aggregates derived triples by subject into normalized JSON-LD nodes.
/// Type derivations land in `@type`; everything else becomes an
/// array-valued predicate entry with set semantics.
fn aggregate(triples: Vec<DerivedTriple>) -> Vec<JsonNode> {
    let mut nodes: BTreeMap<String, JsonNode> = BTreeMap::new();
    for triple in triples {
        let node = nodes.entry(triple.subject.clone()).or_insert_with(|| {
            let mut node = JsonNode::new();
            node.insert("@id".to_owned(), Value::from(triple.subject.clone()));
            node
        });

        if triple.predicate == rdf::TYPE {
            if let Some(class) = triple.object.get("@id").and_then(Value::as_str) {
                let types = node
                    .entry("@type".to_owned())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(types) = types {
                    if !types.iter().any(|member| member == class) {
                        types.push(Value::from(class));
                    }
                }
                continue;
            }
        }

        let values = node
            .entry(triple.predicate.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(values) = values {
            if !values.contains(&triple.object) {
                values.push(triple.object);
            }
        }
    }
    nodes.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aggregation_groups_by_subject_with_set_semantics() {
        let triples = vec![
            DerivedTriple {
                subject: "urn:x".to_owned(),
                predicate: "urn:p".to_owned(),
                object: json!({"@value": "a"}),
            },
            DerivedTriple {
                subject: "urn:x".to_owned(),
                predicate: "urn:p".to_owned(),
                object: json!({"@value": "a"}),
            },
            DerivedTriple {
                subject: "urn:x".to_owned(),
                predicate: rdf::TYPE.to_owned(),
                object: json!({"@id": "urn:C"}),
            },
            DerivedTriple {
                subject: "urn:y".to_owned(),
                predicate: "urn:p".to_owned(),
                object: json!({"@id": "urn:x"}),
            },
        ];
        let nodes = aggregate(triples);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["@id"], json!("urn:x"));
        assert_eq!(nodes[0]["@type"], json!(["urn:C"]));
        assert_eq!(nodes[0]["urn:p"], json!([{"@value": "a"}]));
        assert_eq!(nodes[1]["urn:p"], json!([{"@id": "urn:x"}]));
    }
}
