//! Startup loaders for the dictionary, ontology, and rules files.
//!
//! A missing or malformed file is a configuration error for that graph
//! only: it is logged and the remaining loaders continue.

use serde_json::Value;
use std::path::Path;
use urdf_store::error::DictionaryError;
use urdf_store::{Dictionary, QuadStore, StoreError};

/// A configuration error while loading one startup file.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reads and parses one JSON document.
pub async fn read_json(path: &str) -> Result<Value, LoaderError> {
    let bytes = tokio::fs::read(Path::new(path))
        .await
        .map_err(|source| LoaderError::Io {
            path: path.to_owned(),
            source,
        })?;
    serde_json::from_slice(&bytes).map_err(|source| LoaderError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Loads the dictionary file. Failure is fatal for the dictionary only;
/// the store then runs uncompressed with an empty dictionary.
pub async fn load_dictionary(path: &str) -> Dictionary {
    match read_json(path).await {
        Ok(doc) => match Dictionary::from_value(&doc) {
            Ok(dictionary) => {
                tracing::info!(path, iris = dictionary.len(), "dictionary loaded");
                dictionary
            }
            Err(error) => {
                tracing::error!(path, %error, "dictionary rejected, compression disabled");
                Dictionary::default()
            }
        },
        Err(error) => {
            tracing::error!(path, %error, "dictionary unavailable, compression disabled");
            Dictionary::default()
        }
    }
}

/// Loads one startup JSON-LD file into a named graph. Returns the graph's
/// triple count, or `None` when the file was skipped.
pub async fn load_graph_file(store: &mut QuadStore, path: &str, gid: &str) -> Option<usize> {
    match read_json(path).await {
        Ok(doc) => match store.load_into(gid, &doc) {
            Ok(()) => {
                let size = store.size(Some(gid));
                tracing::info!(path, gid, size, "startup graph loaded");
                Some(size)
            }
            Err(error) => {
                tracing::error!(path, gid, %error, "startup graph rejected");
                None
            }
        },
        Err(error) => {
            tracing::warn!(path, gid, %error, "startup graph skipped");
            None
        }
    }
}
