use clap::{Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(about, version, name = "urdf")]
/// URDF semantic runtime: named-graph store, SPARQL gateway, and
/// rule-driven inference for a flow engine
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the URDF runtime and its HTTP façade
    Serve {
        /// Host and port the façade binds to
        #[arg(short, long, default_value = "localhost:1881", value_hint = ValueHint::Hostname)]
        bind: String,
        /// Allows cross-origin requests
        #[arg(long)]
        cors: bool,
        /// Base URL of the flow engine's admin surface
        ///
        /// When set, the runtime loads the environment graph from
        /// /settings and /diagnostics and watches /flows for changes.
        #[arg(long, value_hint = ValueHint::Url)]
        host_url: Option<String>,
        /// Host instance id; feeds the application IRI
        #[arg(long)]
        instance: Option<String>,
        /// Coalescing window for flow change events, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
        /// How often the admin surface is polled for flow changes, in
        /// milliseconds
        #[arg(long, default_value_t = 5000)]
        poll_interval_ms: u64,
    },
}
