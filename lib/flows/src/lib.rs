//! Translation of a flow-configuration document into the application
//! knowledge graph.
//!
//! The translator is deterministic: byte-identical input produces an
//! identical dataset, including every generated identifier, so the host
//! can rebuild the application graph on every change event without
//! diffing.

pub mod translator;
pub mod values;

pub use translator::{extract_nodes, Translator};
pub use values::{encode_property, urn_encode};
