use crate::error::DictionaryError;
use serde_json::Value;
use std::collections::HashMap;

/// An ordered, read-only sequence of IRIs defining the `z:<n>` token set.
///
/// Index `i` defines the token `z:i`. The sequence is fixed once the
/// dictionary is built; duplicates keep their first position and later
/// occurrences are ignored. Token form and IRI form are interchangeable,
/// so lookups never fail: unknown inputs pass through unchanged.
#[derive(Debug, Default)]
pub struct Dictionary {
    iris: Vec<String>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    /// Builds a dictionary from a parsed JSON document.
    ///
    /// The document must be an array of strings. Anything else fails with a
    /// [`DictionaryError`], which is fatal for the loader that supplied the
    /// document.
    pub fn from_value(value: &Value) -> Result<Self, DictionaryError> {
        let entries = value.as_array().ok_or(DictionaryError::NotAnArray)?;
        let mut iris = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let iri = entry
                .as_str()
                .ok_or(DictionaryError::NonStringEntry { index })?;
            iris.push(iri.to_owned());
        }
        Ok(Self::from_iris(iris))
    }

    /// Builds a dictionary from an ordered IRI list. First occurrence wins.
    pub fn from_iris(entries: impl IntoIterator<Item = String>) -> Self {
        let mut iris = Vec::new();
        let mut index = HashMap::new();
        for iri in entries {
            if !index.contains_key(&iri) {
                index.insert(iri.clone(), iris.len());
                iris.push(iri);
            }
        }
        Self { iris, index }
    }

    /// Returns the position of `iri`, if the dictionary knows it.
    pub fn index_of(&self, iri: &str) -> Option<usize> {
        self.index.get(iri).copied()
    }

    /// Returns the IRI stored at `index`.
    pub fn iri_of(&self, index: usize) -> Option<&str> {
        self.iris.get(index).map(String::as_str)
    }

    /// Compresses `iri` to its `z:<n>` token, or returns it unchanged.
    pub fn compress<'a>(&self, iri: &'a str) -> std::borrow::Cow<'a, str> {
        match self.index_of(iri) {
            Some(index) => std::borrow::Cow::Owned(format!("z:{index}")),
            None => std::borrow::Cow::Borrowed(iri),
        }
    }

    /// Expands a `z:<n>` token back to its IRI, or returns the input
    /// unchanged when it is not a token or the index is out of range.
    pub fn expand<'a>(&'a self, token: &'a str) -> &'a str {
        match token_index(token) {
            Some(index) => self.iri_of(index).unwrap_or(token),
            None => token,
        }
    }

    /// The IRI at index 0, which by contract is the type predicate.
    ///
    /// The SPARQL gateway rewrites this IRI to the bare keyword `a` in
    /// predicate position, mirroring the store's internal representation of
    /// type assertions.
    pub fn type_predicate(&self) -> Option<&str> {
        self.iri_of(0)
    }

    /// The full ordered IRI list, as served by `GET /urdf/zurl`.
    pub fn as_slice(&self) -> &[String] {
        &self.iris
    }

    /// Number of known IRIs.
    pub fn len(&self) -> usize {
        self.iris.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.iris.is_empty()
    }
}

/// Parses the exact token shape `z:<digits>`.
pub(crate) fn token_index(token: &str) -> Option<usize> {
    let digits = token.strip_prefix("z:")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dictionary() -> Dictionary {
        Dictionary::from_iris(
            [
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
                "https://schema.org/name",
            ]
            .map(String::from),
        )
    }

    #[test]
    fn compress_known_iri() {
        let dictionary = dictionary();
        assert_eq!(dictionary.compress("https://schema.org/name"), "z:1");
        assert_eq!(dictionary.compress("urn:unknown"), "urn:unknown");
    }

    #[test]
    fn expand_round_trips_compress() {
        let dictionary = dictionary();
        for iri in dictionary.as_slice() {
            let token = dictionary.compress(iri);
            assert_eq!(dictionary.expand(&token), iri);
        }
    }

    #[test]
    fn expand_leaves_unknown_tokens_alone() {
        let dictionary = dictionary();
        assert_eq!(dictionary.expand("z:99"), "z:99");
        assert_eq!(dictionary.expand("z:x"), "z:x");
        assert_eq!(dictionary.expand("z:"), "z:");
        assert_eq!(dictionary.expand("urn:x"), "urn:x");
    }

    #[test]
    fn duplicates_keep_first_position() {
        let dictionary = Dictionary::from_iris(
            ["urn:a", "urn:b", "urn:a"].map(String::from),
        );
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.index_of("urn:a"), Some(0));
        assert_eq!(dictionary.index_of("urn:b"), Some(1));
    }

    #[test]
    fn rejects_non_string_entries() {
        assert!(matches!(
            Dictionary::from_value(&json!(["urn:a", 5])),
            Err(DictionaryError::NonStringEntry { index: 1 })
        ));
        assert!(matches!(
            Dictionary::from_value(&json!({"iris": []})),
            Err(DictionaryError::NotAnArray)
        ));
    }
}
