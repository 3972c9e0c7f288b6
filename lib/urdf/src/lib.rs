//! Umbrella crate re-exporting the URDF runtime's components.
//!
//! The store holds named graphs of normalized JSON-LD nodes compressed
//! through an IRI dictionary; the gateway evaluates rewritten SPARQL over
//! it; the translator maps flow configurations onto the application
//! graph; and the orchestrator rebuilds the inferred graph from the rules
//! graph on every change.

pub mod flows {
    pub use urdf_flows::*;
}

pub mod inference {
    pub use urdf_inference::*;
}

pub mod runtime {
    pub use urdf_runtime::*;
}

pub mod sparql {
    pub use urdf_sparql::*;
}

pub mod store {
    pub use urdf_store::*;
}
