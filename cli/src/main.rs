use crate::cli::{Args, Command};
use clap::Parser;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use urdf::runtime::{Config, FlowsSource, HostClient, Runtime, RuntimeHandle};
use urdf::sparql::OxigraphEvaluator;
use urdf_web::ServerConfig;

mod cli;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = Args::parse();
    match matches.command {
        Command::Serve {
            bind,
            cors,
            host_url,
            instance,
            debounce_ms,
            poll_interval_ms,
        } => {
            let mut config = Config::from_env();
            if let Some(host_url) = host_url {
                config.host_url = Some(host_url.trim_end_matches('/').to_owned());
            }
            if let Some(instance) = instance {
                config.instance = instance;
            }
            if let Some(debounce_ms) = debounce_ms {
                config.debounce = Duration::from_millis(debounce_ms);
            }

            let flows = config
                .host_url
                .clone()
                .map(|url| Arc::new(HostClient::new(url)) as Arc<dyn FlowsSource>);
            let handle =
                Runtime::start(config.clone(), Arc::new(OxigraphEvaluator), None, flows).await;

            if let Some(host_url) = config.host_url {
                tokio::spawn(watch_flows(
                    handle.clone(),
                    HostClient::new(host_url),
                    Duration::from_millis(poll_interval_ms),
                ));
            }

            urdf_web::serve(ServerConfig {
                handle,
                bind,
                cors,
            })
            .await
        }
    }
}

/// Watches the admin surface for flow changes.
///
/// A standalone process has no in-process event bus, so the revision of
/// `GET /flows` stands in for the `flows:*` lifecycle events: the first
/// successful fetch plays `flows:started`, every revision change after
/// that plays `flows:updated`.
async fn watch_flows(handle: RuntimeHandle, client: HostClient, interval: Duration) {
    let mut last_revision: Option<String> = None;
    loop {
        match client.fetch_flows().await {
            Ok(doc) => {
                let revision = flows_revision(&doc);
                if last_revision.as_deref() != Some(revision.as_str()) {
                    let reason = if last_revision.is_none() {
                        "flows:started"
                    } else {
                        "flows:updated"
                    };
                    handle.notify_flows(reason).await;
                    last_revision = Some(revision);
                }
            }
            Err(error) => {
                tracing::debug!(%error, "flows poll failed");
            }
        }
        tokio::time::sleep(interval).await;
    }
}

/// The host's flow revision when it reports one, a content hash
/// otherwise.
fn flows_revision(doc: &Value) -> String {
    if let Some(revision) = doc.get("rev").and_then(Value::as_str) {
        return revision.to_owned();
    }
    let mut hasher = DefaultHasher::new();
    doc.to_string().hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
