//! In-memory named-graph store for JSON-LD datasets.
//!
//! The store keeps every graph as a set of normalized JSON-LD nodes. Nodes
//! are held in dictionary-compressed form (`z:<n>` tokens) and expanded on
//! every externally observable answer. The entry point is [`QuadStore`];
//! the compaction dictionary is [`Dictionary`].

pub mod dictionary;
pub mod error;
pub mod jsonld;
pub mod quads;
pub mod store;
pub mod vocab;

pub use dictionary::Dictionary;
pub use error::StoreError;
pub use store::{JsonNode, QuadStore};
