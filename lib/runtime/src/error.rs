use urdf_sparql::EvaluatorError;
use urdf_store::StoreError;

/// The error surface a runtime command can answer with, mirroring the
/// HTTP-facing taxonomy: schema and contract violations map to 400,
/// not-found to 404, conflicts to 409, unimplemented evaluator features
/// to 501, everything else to 500.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),
    #[error("contract violation: {0}")]
    Contract(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// The runtime task is gone; only seen during shutdown.
    #[error("runtime unavailable")]
    Unavailable,
}

impl RuntimeError {
    /// Stable error-kind name carried in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::Store(StoreError::SchemaViolation(_)) => "SchemaViolation",
            RuntimeError::Store(StoreError::NotFound(_)) => "NotFound",
            RuntimeError::Store(_) => "StoreError",
            RuntimeError::Evaluator(EvaluatorError::ContractViolation(_))
            | RuntimeError::Contract(_) => "ContractViolation",
            RuntimeError::Evaluator(EvaluatorError::NotImplemented(_)) => "NotImplemented",
            RuntimeError::Evaluator(_) => "EvaluatorError",
            RuntimeError::Conflict(_) => "Conflict",
            RuntimeError::Unavailable => "Unavailable",
        }
    }
}
