//! Query rewriting into dictionary-token form.

use crate::error::EvaluatorError;
use regex::Regex;
use std::sync::LazyLock;
use urdf_store::Dictionary;

static PROLOGUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(prefix|base)\b").expect("static pattern"));

/// Rejects queries that carry a standalone `PREFIX` or `BASE` token
/// (case-insensitive). The store never resolves external contexts, so
/// prologues must be expanded by the caller.
pub fn ensure_no_prologue(query: &str) -> Result<(), EvaluatorError> {
    for found in PROLOGUE.find_iter(query) {
        // A variable such as ?prefix is not a standalone token.
        let sigil = query[..found.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c == '?' || c == '$' || c == ':');
        if !sigil {
            return Err(EvaluatorError::ContractViolation(format!(
                "queries must not contain '{}'; expand prefixes before submitting",
                found.as_str().to_uppercase()
            )));
        }
    }
    Ok(())
}

/// Rewrites every `<IRI>` reference the dictionary knows into its
/// `<z:<n>>` token form.
///
/// The IRI mapping to index 0 is the type predicate; outside call
/// expressions it is rewritten to SPARQL's bare `a` keyword, mirroring the
/// store's internal representation of type assertions. Inside parentheses
/// (function calls, filters) the plain token form is used instead, since
/// `a` is only syntax in predicate position.
pub fn rewrite_query(dictionary: &Dictionary, query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut rest = query;
    let mut depth = 0usize;
    let mut chars = rest.char_indices();

    while let Some((at, c)) = chars.next() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '\'' | '"' => {
                // Skip string literals so IRIs inside them survive.
                let quote = c;
                let mut escaped = false;
                for (_, inner) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if inner == '\\' {
                        escaped = true;
                    } else if inner == quote {
                        break;
                    }
                }
            }
            '<' => {
                if let Some(reference) = iri_reference(&rest[at..]) {
                    out.push_str(&rest[..at]);
                    out.push_str(&rewrite_reference(dictionary, reference, depth));
                    rest = &rest[at + reference.len() + 2..];
                    chars = rest.char_indices();
                    continue;
                }
            }
            _ => {}
        }
    }
    out.push_str(rest);
    out
}

/// Extracts the content of an IRI reference starting at `<`, or `None`
/// when the angle bracket is a comparison operator.
fn iri_reference(tail: &str) -> Option<&str> {
    let inner = &tail[1..];
    let end = inner.find('>')?;
    let content = &inner[..end];
    if content.is_empty() || content.contains(char::is_whitespace) || content.contains('<') {
        return None;
    }
    Some(content)
}

fn rewrite_reference(dictionary: &Dictionary, iri: &str, depth: usize) -> String {
    match dictionary.index_of(iri) {
        Some(0) if depth == 0 => "a".to_owned(),
        Some(index) => format!("<z:{index}>"),
        None => format!("<{iri}>"),
    }
}
