//! IRI constants shared across the runtime.
//!
//! These are the JSON-LD string forms; quad-level code uses the
//! [`oxrdf::vocab`] constants instead.

/// RDF core vocabulary.
pub mod rdf {
    /// The type predicate. By contract this is index 0 of the dictionary.
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// XML Schema datatypes used for literal coercion.
pub mod xsd {
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// The subset of <https://schema.org/> the runtime emits.
pub mod schema {
    pub const ADDITIONAL_PROPERTY: &str = "https://schema.org/additionalProperty";
    pub const ADDITIONAL_TYPE: &str = "https://schema.org/additionalType";
    pub const ENCODING_FORMAT: &str = "https://schema.org/encodingFormat";
    pub const HAS_PART: &str = "https://schema.org/hasPart";
    pub const IDENTIFIER: &str = "https://schema.org/identifier";
    pub const IS_PART_OF: &str = "https://schema.org/isPartOf";
    pub const ITEM: &str = "https://schema.org/item";
    pub const ITEM_LIST: &str = "https://schema.org/ItemList";
    pub const ITEM_LIST_ELEMENT: &str = "https://schema.org/itemListElement";
    pub const KEYWORDS: &str = "https://schema.org/keywords";
    pub const LIST_ITEM: &str = "https://schema.org/ListItem";
    pub const MEMBER_OF: &str = "https://schema.org/memberOf";
    pub const NAME: &str = "https://schema.org/name";
    pub const POSITION: &str = "https://schema.org/position";
    pub const PROGRAMMING_LANGUAGE: &str = "https://schema.org/programmingLanguage";
    pub const PROPERTY_VALUE: &str = "https://schema.org/PropertyValue";
    pub const SOFTWARE_SOURCE_CODE: &str = "https://schema.org/SoftwareSourceCode";
    pub const STRUCTURED_VALUE: &str = "https://schema.org/StructuredValue";
    pub const TEXT: &str = "https://schema.org/text";
    pub const VALUE: &str = "https://schema.org/value";
}

/// The runtime's own vocabulary and URN layout.
pub mod nrua {
    /// Class of the application root node.
    pub const APPLICATION: &str = "urn:nrua:v:Application";
    /// Class of the per-instance environment node.
    pub const ENVIRONMENT: &str = "urn:nrua:v:Environment";
    /// Class of a flow (tab) node.
    pub const FLOW: &str = "urn:nrua:v:Flow";
    /// Class of a non-tab node.
    pub const NODE: &str = "urn:nrua:v:Node";
    /// Class of a wired output gate.
    pub const NODE_OUTPUT: &str = "urn:nrua:v:NodeOutput";
    /// Class of an inference rule.
    pub const RULE: &str = "urn:nrua:v:Rule";
    /// Output-gate target reference predicate.
    pub const TARGET: &str = "urn:nrua:v:target";

    /// Prefix of helper predicates produced during reasoning. Derived
    /// triples under this prefix are never persisted to the inferred graph.
    pub const PV_PREFIX: &str = "urn:nrua:pv:";
    /// Prefix of every identifier minted by the translator.
    pub const URN_PREFIX: &str = "urn:nrua:";
}
