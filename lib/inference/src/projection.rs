//! Normalization of rule outputs into triples.
//!
//! Both execution paths converge here: SPARQL bindings are read through
//! the `s`/`p`/`o` convention (with their longhand synonyms), and N3
//! derivations are decoded from token form. The result is a uniform
//! [`DerivedTriple`] whose object is already a JSON-LD value object.

use crate::reasoner::DerivedFact;
use oxrdf::vocab::xsd;
use oxrdf::Term;
use serde_json::Value;
use urdf_sparql::Binding;

/// One derived triple, ready for aggregation into JSON-LD nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTriple {
    /// IRI or `_:`-prefixed blank-node identifier.
    pub subject: String,
    /// Predicate IRI.
    pub predicate: String,
    /// A JSON-LD value object: `{"@id": ...}` or `{"@value": ...}`.
    pub object: Value,
}

const SUBJECT_VARIABLES: &[&str] = &["s", "subject"];
const PREDICATE_VARIABLES: &[&str] = &["p", "predicate"];
const OBJECT_VARIABLES: &[&str] = &["o", "object"];

/// Interprets one solution row as a triple. Rows without the full
/// `s`/`p`/`o` shape (or with a literal in subject or predicate position)
/// carry no triple.
pub fn triple_from_binding(binding: &Binding) -> Option<DerivedTriple> {
    let subject = lookup(binding, SUBJECT_VARIABLES)?;
    let predicate = lookup(binding, PREDICATE_VARIABLES)?;
    let object = lookup(binding, OBJECT_VARIABLES)?;

    Some(DerivedTriple {
        subject: identifier(subject)?,
        predicate: match predicate {
            Term::NamedNode(node) => node.as_str().to_owned(),
            _ => return None,
        },
        object: object_value(object),
    })
}

/// Serializes one solution row as an N-Triples line for the reasoner's
/// fact base.
pub fn ntriples_line(binding: &Binding) -> Option<String> {
    let subject = lookup(binding, SUBJECT_VARIABLES)?;
    let predicate = lookup(binding, PREDICATE_VARIABLES)?;
    let object = lookup(binding, OBJECT_VARIABLES)?;

    if !matches!(subject, Term::NamedNode(_) | Term::BlankNode(_)) {
        return None;
    }
    if !matches!(predicate, Term::NamedNode(_)) {
        return None;
    }
    Some(format!("{subject} {predicate} {object} ."))
}

/// Decodes a fact from the reasoner's token form.
pub fn decode_fact(fact: &DerivedFact) -> Option<DerivedTriple> {
    let subject = decode_identifier(&fact.subject)?;
    let predicate = match strip_angles(&fact.predicate) {
        Some(iri) => iri.to_owned(),
        None => return None,
    };

    let object = if let Some(iri) = strip_angles(&fact.object) {
        serde_json::json!({ "@id": iri })
    } else if fact.object.starts_with("_:") {
        serde_json::json!({ "@id": fact.object })
    } else {
        decode_literal(&fact.object)
    };

    Some(DerivedTriple {
        subject,
        predicate,
        object,
    })
}

fn lookup<'a>(binding: &'a Binding, names: &[&str]) -> Option<&'a Term> {
    names.iter().find_map(|name| binding.get(*name))
}

/// IRI or blank-node identifier of a term usable in subject position.
fn identifier(term: &Term) -> Option<String> {
    match term {
        Term::NamedNode(node) => Some(node.as_str().to_owned()),
        Term::BlankNode(node) => Some(format!("_:{}", node.as_str())),
        _ => None,
    }
}

fn object_value(term: &Term) -> Value {
    match term {
        Term::NamedNode(node) => serde_json::json!({ "@id": node.as_str() }),
        Term::BlankNode(node) => {
            serde_json::json!({ "@id": format!("_:{}", node.as_str()) })
        }
        Term::Literal(literal) => {
            if let Some(language) = literal.language() {
                serde_json::json!({ "@value": literal.value(), "@language": language })
            } else if literal.datatype() != xsd::STRING {
                serde_json::json!({
                    "@value": literal.value(),
                    "@type": literal.datatype().as_str(),
                })
            } else {
                serde_json::json!({ "@value": literal.value() })
            }
        }
        #[allow(unreachable_patterns)]
        _ => Value::Null,
    }
}

fn decode_identifier(token: &str) -> Option<String> {
    if let Some(iri) = strip_angles(token) {
        return Some(iri.to_owned());
    }
    if token.starts_with("_:") {
        return Some(token.to_owned());
    }
    None
}

fn strip_angles(token: &str) -> Option<&str> {
    token.strip_prefix('<')?.strip_suffix('>')
}

/// N3-style quote stripping: `"text"`, `"text"@lang`, `"text"^^<dt>`.
/// Unquoted tokens pass through as plain values.
fn decode_literal(token: &str) -> Value {
    let Some(rest) = token.strip_prefix('"') else {
        return serde_json::json!({ "@value": token });
    };
    let Some(end) = find_closing_quote(rest) else {
        return serde_json::json!({ "@value": token });
    };
    let value = unescape(&rest[..end]);
    let suffix = &rest[end + 1..];

    if let Some(language) = suffix.strip_prefix('@') {
        serde_json::json!({ "@value": value, "@language": language })
    } else if let Some(datatype) = suffix.strip_prefix("^^").and_then(strip_angles) {
        if datatype == xsd::STRING.as_str() {
            serde_json::json!({ "@value": value })
        } else {
            serde_json::json!({ "@value": value, "@type": datatype })
        }
    } else {
        serde_json::json!({ "@value": value })
    }
}

fn find_closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(index);
        }
    }
    None
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
