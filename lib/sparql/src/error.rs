use urdf_store::StoreError;

/// An error raised on the query path.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EvaluatorError {
    /// The query violates the gateway contract (e.g. it carries a
    /// `PREFIX` or `BASE` prologue the store refuses to resolve).
    #[error("contract violation: {0}")]
    ContractViolation(String),
    /// The evaluator reported an unsupported feature.
    #[error("not implemented by the evaluator: {0}")]
    NotImplemented(String),
    /// The evaluator failed to parse or evaluate the query.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
    /// The store's dataset could not be materialized as quads.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EvaluatorError {
    /// Classifies an evaluator message, promoting "not implemented" style
    /// failures to their own kind so callers can answer 501 rather
    /// than 500.
    pub fn from_evaluator_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains("not implemented")
            || message.to_lowercase().contains("not supported")
        {
            Self::NotImplemented(message)
        } else {
            Self::Evaluation(message)
        }
    }
}
