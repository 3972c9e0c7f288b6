//! SPARQL gateway for the URDF store.
//!
//! The store holds data in dictionary-token form, so queries are rewritten
//! on the way in ([`rewrite`]) and bindings are expanded on the way out
//! ([`results`]). Evaluation itself is a black-box capability behind
//! [`SparqlEvaluator`]; the default implementation wraps oxigraph's
//! in-memory store.

pub mod error;
pub mod evaluator;
pub mod gateway;
pub mod results;
pub mod rewrite;

pub use error::EvaluatorError;
pub use evaluator::{Binding, OxigraphEvaluator, QueryOutcome, SparqlEvaluator};
pub use gateway::{QueryResponse, SparqlGateway};
