//! The runtime task that owns the store.
//!
//! Every mutation, load, clear, query, and rule run executes inside one
//! serialized task; callers talk to it through a [`RuntimeHandle`]. Host
//! flow events are debounced through a coalescing window before they
//! trigger an application-graph rebuild and an inference cycle.

pub mod config;
pub mod debounce;
pub mod env;
pub mod error;
pub mod events;
pub mod host;
pub mod loaders;
pub mod runtime;

pub use config::Config;
pub use error::RuntimeError;
pub use events::{Event, EventChannel};
pub use host::{FlowsSource, HostClient, HostError};
pub use runtime::{LoadFileReport, Runtime, RuntimeHandle};
