//! The inference orchestrator.
//!
//! On every trigger the orchestrator reads the rules graph, executes each
//! rule (SPARQL directly, N3 through the optional reasoner capability),
//! and deterministically replaces the inferred graph with the aggregated
//! derivations. Per-rule failures are logged and skipped; only a failure
//! of the final graph replacement surfaces to the caller.

pub mod error;
pub mod orchestrator;
pub mod projection;
pub mod reasoner;
pub mod rules;

pub use error::InferenceError;
pub use orchestrator::{InferenceOutcome, Orchestrator};
pub use projection::DerivedTriple;
pub use reasoner::{DerivedFact, N3Reasoner, ReasonerError};
pub use rules::{Rule, RuleLanguage};
