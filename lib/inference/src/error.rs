use urdf_sparql::EvaluatorError;
use urdf_store::StoreError;

/// An error that aborts a whole inference cycle.
///
/// Individual rule failures never surface here; they are logged and the
/// remaining rules continue. Only a failure while replacing the inferred
/// graph reaches the caller, and the store is left unchanged in that
/// case.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
}
