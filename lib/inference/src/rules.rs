//! The rule model read from the rules graph.

use serde_json::Value;
use std::collections::BTreeMap;
use urdf_store::vocab::{nrua, schema};
use urdf_store::JsonNode;

/// Execution path of a rule program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleLanguage {
    Sparql,
    N3,
}

/// One executable rule from the rules graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: String,
    pub language: RuleLanguage,
    /// The rule program (`schema:text`).
    pub text: String,
    /// For N3 rules: the SPARQL projection query generating the fact base.
    pub projection: Option<String>,
}

/// Collects the executable rules out of the expanded rules-graph nodes.
///
/// A rule is a node whose `@type` includes the rule class and that
/// carries a `schema:text`; nodes without a program text are skipped with
/// a log line. N3 rules dereference their `schema:hasPart` projection
/// sub-resource through the id-indexed view of the same graph.
pub fn rules_from_graph(nodes: &[JsonNode]) -> Vec<Rule> {
    let index: BTreeMap<&str, &JsonNode> = nodes
        .iter()
        .filter_map(|node| Some((node.get("@id")?.as_str()?, node)))
        .collect();

    let mut rules = Vec::new();
    for node in nodes {
        if !has_type(node, nrua::RULE) {
            continue;
        }
        let id = node
            .get("@id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let Some(text) = first_string(node, schema::TEXT) else {
            tracing::warn!(rule = %id, "rule has no program text, skipping");
            continue;
        };

        let language = rule_language(node);
        let projection = match language {
            RuleLanguage::N3 => first_reference(node, schema::HAS_PART)
                .and_then(|part| index.get(part))
                .filter(|part| has_type(part, schema::SOFTWARE_SOURCE_CODE))
                .and_then(|part| first_string(part, schema::TEXT))
                .map(str::to_owned),
            RuleLanguage::Sparql => None,
        };

        rules.push(Rule {
            id,
            language,
            text: text.to_owned(),
            projection,
        });
    }
    rules
}

/// Selects the execution path: `schema:programmingLanguage` wins, and an
/// N3 `schema:encodingFormat` is honored when the language slot is absent.
fn rule_language(node: &JsonNode) -> RuleLanguage {
    if let Some(language) = first_string(node, schema::PROGRAMMING_LANGUAGE) {
        return match language.to_lowercase().as_str() {
            "n3" | "notation3" => RuleLanguage::N3,
            _ => RuleLanguage::Sparql,
        };
    }
    if let Some(format) = first_string(node, schema::ENCODING_FORMAT) {
        if format.to_lowercase().contains("n3") {
            return RuleLanguage::N3;
        }
    }
    RuleLanguage::Sparql
}

fn has_type(node: &JsonNode, class: &str) -> bool {
    node.get("@type")
        .and_then(Value::as_array)
        .is_some_and(|types| types.iter().any(|member| member == class))
}

/// First `@value` string under `key`.
fn first_string<'a>(node: &'a JsonNode, key: &str) -> Option<&'a str> {
    node.get(key)?
        .as_array()?
        .iter()
        .find_map(|member| member.get("@value")?.as_str())
}

/// First `@id` reference under `key`.
fn first_reference<'a>(node: &'a JsonNode, key: &str) -> Option<&'a str> {
    node.get(key)?
        .as_array()?
        .iter()
        .find_map(|member| member.get("@id")?.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes(value: Value) -> Vec<JsonNode> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|node| node.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn sparql_rule_is_recognized() {
        let rules = rules_from_graph(&nodes(json!([{
            "@id": "urn:rule:1",
            "@type": [nrua::RULE],
            "https://schema.org/text": [{"@value": "SELECT ?s ?p ?o WHERE { ?s ?p ?o }"}],
            "https://schema.org/programmingLanguage": [{"@value": "sparql"}],
        }])));
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].language, RuleLanguage::Sparql);
        assert!(rules[0].projection.is_none());
    }

    #[test]
    fn n3_rule_dereferences_its_projection() {
        let rules = rules_from_graph(&nodes(json!([
            {
                "@id": "urn:rule:2",
                "@type": [nrua::RULE],
                "https://schema.org/text": [{"@value": "{ ?a ?b ?c } => { ?a ?b ?c }."}],
                "https://schema.org/programmingLanguage": [{"@value": "notation3"}],
                "https://schema.org/hasPart": [{"@id": "urn:rule:2:projection"}],
            },
            {
                "@id": "urn:rule:2:projection",
                "@type": ["https://schema.org/SoftwareSourceCode"],
                "https://schema.org/text": [{"@value": "SELECT ?s WHERE { ?s ?p ?o }"}],
            },
        ])));
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].language, RuleLanguage::N3);
        assert_eq!(
            rules[0].projection.as_deref(),
            Some("SELECT ?s WHERE { ?s ?p ?o }")
        );
    }

    #[test]
    fn encoding_format_signals_n3_when_language_is_absent() {
        let rules = rules_from_graph(&nodes(json!([{
            "@id": "urn:rule:3",
            "@type": [nrua::RULE],
            "https://schema.org/text": [{"@value": "{ } => { }."}],
            "https://schema.org/encodingFormat": [{"@value": "text/n3"}],
        }])));
        assert_eq!(rules[0].language, RuleLanguage::N3);
    }

    #[test]
    fn textless_rules_and_foreign_nodes_are_skipped() {
        let rules = rules_from_graph(&nodes(json!([
            {"@id": "urn:rule:4", "@type": [nrua::RULE]},
            {"@id": "urn:other", "@type": ["urn:C"]},
        ])));
        assert!(rules.is_empty());
    }
}
