//! Extraction of [`oxrdf`] quads from the store's compressed node maps.
//!
//! The SPARQL gateway rewrites incoming queries into token form, so the
//! dataset handed to the evaluator stays in token form as well: `z:<n>`
//! is itself a valid IRI and round-trips through any conformant engine.
//! `@type` entries surface as `rdf:type` quads, matching the bare `a`
//! keyword the rewriter emits for the type predicate.

use crate::error::StoreError;
use crate::store::{JsonNode, QuadStore};
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use serde_json::Value;

/// Materializes the whole store as a quad dataset.
pub fn dataset_quads(store: &QuadStore) -> Result<Vec<Quad>, StoreError> {
    // Index 0 of the dictionary is the type predicate by contract; its
    // compressed key must surface as rdf:type so the rewriter's bare `a`
    // matches it.
    let type_key = (!store.dictionary().is_empty()).then_some("z:0");

    let mut quads = Vec::new();
    for (gid, nodes) in store.compressed_graphs() {
        let gid = store.dictionary().compress(gid);
        let graph_name: GraphName = named_node(&gid)?.into();
        for node in nodes {
            node_quads(node, &graph_name, type_key, &mut quads)?;
        }
    }
    Ok(quads)
}

fn node_quads(
    node: &JsonNode,
    graph_name: &GraphName,
    type_key: Option<&str>,
    quads: &mut Vec<Quad>,
) -> Result<(), StoreError> {
    let Some(id) = node.get("@id").and_then(Value::as_str) else {
        return Ok(());
    };
    let subject = subject(id)?;

    for (key, value) in node {
        let Some(members) = value.as_array() else {
            continue;
        };
        match key.as_str() {
            "@type" => {
                for member in members {
                    let Some(class) = member.as_str() else {
                        continue;
                    };
                    quads.push(Quad::new(
                        subject.clone(),
                        rdf::TYPE,
                        named_node(class)?,
                        graph_name.clone(),
                    ));
                }
            }
            key if key.starts_with('@') => {}
            key => {
                let predicate = if type_key == Some(key) {
                    rdf::TYPE.into_owned()
                } else {
                    named_node(key)?
                };
                for member in members {
                    if let Some(object) = object_term(member)? {
                        quads.push(Quad::new(
                            subject.clone(),
                            predicate.clone(),
                            object,
                            graph_name.clone(),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Decodes a subject or graph identifier: `_:<label>` is a blank node,
/// anything else must be an IRI.
pub fn subject(id: &str) -> Result<Subject, StoreError> {
    match id.strip_prefix("_:") {
        Some(label) => Ok(blank_node(label)?.into()),
        None => Ok(named_node(id)?.into()),
    }
}

/// Decodes one value object into an RDF term. Value objects with a JSON
/// `null` payload carry no triple and decode to `None`.
pub fn object_term(member: &Value) -> Result<Option<Term>, StoreError> {
    let Some(object) = member.as_object() else {
        return Err(StoreError::Term(format!(
            "predicate value is not a value object: {member}"
        )));
    };

    if let Some(id) = object.get("@id").and_then(Value::as_str) {
        return Ok(Some(subject(id)?.into()));
    }

    let Some(payload) = object.get("@value") else {
        return Ok(None);
    };
    let literal = match payload {
        Value::Null => return Ok(None),
        Value::String(text) => {
            if let Some(language) = object.get("@language").and_then(Value::as_str) {
                Literal::new_language_tagged_literal(text, language)
                    .map_err(|e| StoreError::Term(e.to_string()))?
            } else if let Some(datatype) = object.get("@type").and_then(Value::as_str) {
                Literal::new_typed_literal(text.clone(), named_node(datatype)?)
            } else {
                Literal::new_simple_literal(text)
            }
        }
        Value::Bool(flag) => Literal::new_typed_literal(flag.to_string(), xsd::BOOLEAN),
        Value::Number(number) => {
            if number.is_i64() || number.is_u64() {
                Literal::new_typed_literal(number.to_string(), xsd::INTEGER)
            } else {
                Literal::new_typed_literal(number.to_string(), xsd::DOUBLE)
            }
        }
        other => Literal::new_simple_literal(other.to_string()),
    };
    Ok(Some(literal.into()))
}

fn named_node(iri: &str) -> Result<NamedNode, StoreError> {
    NamedNode::new(iri).map_err(|e| StoreError::Term(format!("invalid IRI '{iri}': {e}")))
}

fn blank_node(label: &str) -> Result<BlankNode, StoreError> {
    BlankNode::new(label).map_err(|e| StoreError::Term(format!("invalid blank node: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use serde_json::json;
    use std::sync::Arc;

    fn store_with(doc: Value) -> QuadStore {
        let dictionary = Dictionary::from_iris(
            [
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
                "urn:a/name",
            ]
            .map(String::from),
        );
        let mut store = QuadStore::new(Arc::new(dictionary), "urn:graph:default");
        store.load(&doc).unwrap();
        store
    }

    #[test]
    fn types_become_rdf_type_quads() {
        let store = store_with(json!([{
            "@id": "urn:graph:test",
            "@graph": [{"@id": "urn:x", "@type": ["urn:C"]}],
        }]));
        let quads = dataset_quads(&store).unwrap();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].predicate, rdf::TYPE);
        assert_eq!(quads[0].object, Term::from(NamedNode::new("urn:C").unwrap()));
    }

    #[test]
    fn predicates_stay_in_token_form() {
        let store = store_with(json!([{
            "@id": "urn:graph:test",
            "@graph": [{"@id": "urn:x", "urn:a/name": [{"@value": "N"}]}],
        }]));
        let quads = dataset_quads(&store).unwrap();
        assert_eq!(quads[0].predicate, NamedNode::new("z:1").unwrap());
        assert_eq!(
            quads[0].object,
            Term::from(Literal::new_simple_literal("N"))
        );
    }

    #[test]
    fn literals_carry_language_and_datatype() {
        let store = store_with(json!([{
            "@id": "urn:graph:test",
            "@graph": [{
                "@id": "urn:x",
                "urn:p": [
                    {"@value": "hallo", "@language": "de"},
                    {"@value": 4},
                    {"@value": 1.5},
                    {"@value": true},
                ],
            }],
        }]));
        let quads = dataset_quads(&store).unwrap();
        let literals: Vec<_> = quads
            .iter()
            .map(|quad| match &quad.object {
                Term::Literal(literal) => literal.clone(),
                other => panic!("expected literal, got {other}"),
            })
            .collect();
        assert!(literals.contains(&Literal::new_language_tagged_literal("hallo", "de").unwrap()));
        assert!(literals.contains(&Literal::new_typed_literal("4", xsd::INTEGER)));
        assert!(literals.contains(&Literal::new_typed_literal("1.5", xsd::DOUBLE)));
        assert!(literals.contains(&Literal::new_typed_literal("true", xsd::BOOLEAN)));
    }

    #[test]
    fn type_predicate_keys_surface_as_rdf_type() {
        // "urn:a/type" sits at index 0 of the dictionary below, so a node
        // using it as an explicit predicate stores it as the z:0 key.
        let dictionary = Dictionary::from_iris(["urn:a/type"].map(String::from));
        let mut store = QuadStore::new(Arc::new(dictionary), "urn:graph:default");
        store
            .load(&json!([{
                "@id": "urn:graph:test",
                "@graph": [{"@id": "urn:x", "urn:a/type": [{"@id": "urn:C"}]}],
            }]))
            .unwrap();

        let quads = dataset_quads(&store).unwrap();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].predicate, rdf::TYPE);
    }

    #[test]
    fn blank_subjects_round_trip() {
        let store = store_with(json!([{
            "@id": "urn:graph:test",
            "@graph": [{"@id": "_:b7", "urn:p": [{"@id": "_:b8"}]}],
        }]));
        let quads = dataset_quads(&store).unwrap();
        assert_eq!(
            quads[0].subject,
            Subject::from(BlankNode::new("b7").unwrap())
        );
        assert_eq!(quads[0].object, Term::from(BlankNode::new("b8").unwrap()));
    }
}
