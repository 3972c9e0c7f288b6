//! Conversion of evaluator bindings into JSON answers.

use crate::evaluator::Binding;
use oxrdf::Term;
use serde_json::{Map, Value};
use urdf_store::{jsonld, Dictionary};

/// Converts one solution row into a SPARQL-results-style JSON object and
/// deeply expands every token it carries.
pub fn binding_to_json(dictionary: &Dictionary, binding: &Binding) -> Map<String, Value> {
    let mut row = Map::new();
    for (variable, term) in binding {
        row.insert(variable.clone(), term_to_json(term));
    }
    let mut value = Value::Object(row);
    jsonld::expand_query_value(dictionary, &mut value);
    match value {
        Value::Object(row) => row,
        _ => Map::new(),
    }
}

fn term_to_json(term: &Term) -> Value {
    match term {
        Term::NamedNode(node) => serde_json::json!({
            "type": "uri",
            "value": node.as_str(),
        }),
        Term::BlankNode(node) => serde_json::json!({
            "type": "bnode",
            "value": node.as_str(),
        }),
        Term::Literal(literal) => {
            let mut object = Map::new();
            object.insert("type".to_owned(), Value::from("literal"));
            object.insert("value".to_owned(), Value::from(literal.value()));
            if let Some(language) = literal.language() {
                object.insert("xml:lang".to_owned(), Value::from(language));
            } else if literal.datatype() != oxrdf::vocab::xsd::STRING {
                object.insert(
                    "datatype".to_owned(),
                    Value::from(literal.datatype().as_str()),
                );
            }
            Value::Object(object)
        }
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}
