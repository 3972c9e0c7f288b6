use std::io;

/// An error raised by [`QuadStore`](crate::store::QuadStore) operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A JSON-LD value violates the array-valued predicate contract.
    ///
    /// Loads are rejected before any graph is touched, so the store never
    /// ends up with a partial write.
    #[error("schema violation: {0}")]
    SchemaViolation(String),
    /// The requested node or graph does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A stored value cannot be turned into an RDF term.
    #[error("invalid RDF term: {0}")]
    Term(String),
}

impl From<StoreError> for io::Error {
    #[inline]
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => Self::new(io::ErrorKind::NotFound, error.to_string()),
            _ => Self::new(io::ErrorKind::InvalidData, error.to_string()),
        }
    }
}

/// An error raised while initializing a [`Dictionary`](crate::Dictionary).
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// The dictionary source is not a JSON array.
    #[error("dictionary source must be a JSON array of IRI strings")]
    NotAnArray,
    /// An entry of the dictionary source is not a string.
    #[error("dictionary entry {index} is not a string")]
    NonStringEntry {
        /// Position of the offending entry.
        index: usize,
    },
}
