//! The optional N3 reasoning capability.

/// One fact derived by the reasoner, still in N3 token form: the subject
/// is `<iri>` or `_:label`, the predicate `<iri>`, the object an IRI,
/// blank node, or quoted literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedFact {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

/// An error raised by the reasoner capability.
#[derive(Debug, thiserror::Error)]
#[error("reasoner failed: {0}")]
pub struct ReasonerError(pub String);

/// An injected N3 reasoner.
///
/// The orchestrator hands over a program consisting of the projected fact
/// base in N-Triples, a blank line, and the rule's N3 text; derived facts
/// stream back through the callback. Absence of the capability is a
/// first-class state: the orchestrator then runs in SPARQL-only mode and
/// skips N3 rules.
pub trait N3Reasoner: Send + Sync {
    /// Runs `program` and reports every derived fact through `on_derived`.
    fn reason(
        &self,
        program: &str,
        on_derived: &mut dyn FnMut(DerivedFact),
    ) -> Result<(), ReasonerError>;
}
