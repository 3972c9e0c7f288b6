use crate::config::Config;
use crate::debounce::{debounce_loop, FlowsTrigger};
use crate::env::environment_dataset;
use crate::error::RuntimeError;
use crate::events::{kind, EventChannel};
use crate::host::{FlowsSource, HostClient};
use crate::loaders::{load_dictionary, load_graph_file};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use urdf_flows::{extract_nodes, Translator};
use urdf_inference::{N3Reasoner, Orchestrator};
use urdf_sparql::{QueryResponse, SparqlEvaluator, SparqlGateway};
use urdf_store::vocab::{nrua, schema};
use urdf_store::{Dictionary, JsonNode, QuadStore, StoreError};

/// Answer of a `loadFile` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFileReport {
    pub gid: String,
    pub size: usize,
    pub total_size: usize,
}

enum Command {
    Health {
        reply: oneshot::Sender<usize>,
    },
    Size {
        gid: Option<String>,
        reply: oneshot::Sender<usize>,
    },
    Graph {
        gid: Option<String>,
        reply: oneshot::Sender<Result<(String, Vec<JsonNode>), RuntimeError>>,
    },
    Export {
        gid: String,
        reply: oneshot::Sender<Result<Value, RuntimeError>>,
    },
    Node {
        id: String,
        gid: Option<String>,
        reply: oneshot::Sender<Result<JsonNode, RuntimeError>>,
    },
    Clear {
        gid: Option<String>,
        reply: oneshot::Sender<usize>,
    },
    Load {
        doc: Value,
        reply: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    LoadFile {
        doc: Value,
        reply: oneshot::Sender<Result<LoadFileReport, RuntimeError>>,
    },
    Query {
        sparql: String,
        reply: oneshot::Sender<Result<QueryResponse, RuntimeError>>,
    },
    RuleCreate {
        rule: Value,
        reply: oneshot::Sender<Result<(), RuntimeError>>,
    },
    RuleUpdate {
        rule: Value,
        reply: oneshot::Sender<Result<(), RuntimeError>>,
    },
    RuleDelete {
        id: String,
        reply: oneshot::Sender<Result<(), RuntimeError>>,
    },
    LoadEnvironment {
        dataset: Value,
    },
    FlowsChanged {
        reason: String,
    },
}

/// Client side of the runtime task. Cheap to clone; every operation is
/// posted into the task's serialized command queue.
#[derive(Clone)]
pub struct RuntimeHandle {
    commands: mpsc::Sender<Command>,
    flow_events: mpsc::Sender<String>,
    events: EventChannel,
    dictionary: Arc<Dictionary>,
}

impl RuntimeHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| RuntimeError::Unavailable)?;
        answer.await.map_err(|_| RuntimeError::Unavailable)
    }

    /// Total triple count, the health probe's payload.
    pub async fn health(&self) -> Result<usize, RuntimeError> {
        self.request(|reply| Command::Health { reply }).await
    }

    /// Triple count of one graph, or of the whole store.
    pub async fn size(&self, gid: Option<String>) -> Result<usize, RuntimeError> {
        self.request(|reply| Command::Size { gid, reply }).await
    }

    /// Expanded nodes of one graph (default graph when `gid` is `None`).
    pub async fn graph(
        &self,
        gid: Option<String>,
    ) -> Result<(String, Vec<JsonNode>), RuntimeError> {
        self.request(|reply| Command::Graph { gid, reply }).await?
    }

    /// One graph as a standalone JSON-LD dataset.
    pub async fn export(&self, gid: String) -> Result<Value, RuntimeError> {
        self.request(|reply| Command::Export { gid, reply }).await?
    }

    /// One expanded node by id.
    pub async fn node(
        &self,
        id: String,
        gid: Option<String>,
    ) -> Result<JsonNode, RuntimeError> {
        self.request(|reply| Command::Node { id, gid, reply }).await?
    }

    /// Clears one graph or the whole store; answers the remaining size.
    pub async fn clear(&self, gid: Option<String>) -> Result<usize, RuntimeError> {
        self.request(|reply| Command::Clear { gid, reply }).await
    }

    /// Loads a JSON-LD document; answers the store's total size.
    pub async fn load(&self, doc: Value) -> Result<usize, RuntimeError> {
        self.request(|reply| Command::Load { doc, reply }).await?
    }

    /// Loads a dataset that must name its graph.
    pub async fn load_file(&self, doc: Value) -> Result<LoadFileReport, RuntimeError> {
        self.request(|reply| Command::LoadFile { doc, reply }).await?
    }

    /// Runs a SPARQL query through the gateway.
    pub async fn query(&self, sparql: String) -> Result<QueryResponse, RuntimeError> {
        self.request(|reply| Command::Query { sparql, reply }).await?
    }

    pub async fn rule_create(&self, rule: Value) -> Result<(), RuntimeError> {
        self.request(|reply| Command::RuleCreate { rule, reply }).await?
    }

    pub async fn rule_update(&self, rule: Value) -> Result<(), RuntimeError> {
        self.request(|reply| Command::RuleUpdate { rule, reply }).await?
    }

    pub async fn rule_delete(&self, id: String) -> Result<(), RuntimeError> {
        self.request(|reply| Command::RuleDelete { id, reply }).await?
    }

    /// The dictionary served by `GET /urdf/zurl`.
    pub fn zurl(&self) -> &[String] {
        self.dictionary.as_slice()
    }

    /// Posts one host flow event into the debounced reload path.
    pub async fn notify_flows(&self, reason: impl Into<String>) {
        let _ = self.flow_events.send(reason.into()).await;
    }

    /// The best-effort event channel.
    pub fn events(&self) -> &EventChannel {
        &self.events
    }
}

/// The runtime task: owns the store and serializes every operation.
pub struct Runtime {
    store: QuadStore,
    gateway: SparqlGateway,
    orchestrator: Orchestrator,
    translator: Translator,
    flows: Option<Arc<dyn FlowsSource>>,
    config: Config,
    events: EventChannel,
}

impl Runtime {
    /// Boots the runtime: dictionary, then ontology, then rules, then the
    /// deferred environment load; the first application load happens on
    /// the first flow event. Returns the handle the façade talks through.
    pub async fn start(
        config: Config,
        evaluator: Arc<dyn SparqlEvaluator>,
        reasoner: Option<Arc<dyn N3Reasoner>>,
        flows: Option<Arc<dyn FlowsSource>>,
    ) -> RuntimeHandle {
        let dictionary = Arc::new(load_dictionary(&config.zurl_path).await);
        let mut store = QuadStore::new(Arc::clone(&dictionary), config.default_gid.clone());

        let ontology_size =
            load_graph_file(&mut store, &config.ontology_path, &config.ontology_gid).await;
        let rules_size = load_graph_file(&mut store, &config.rules_path, &config.rules_gid).await;

        let events = EventChannel::default();
        events.publish(
            kind::STARTUP_LOAD,
            "internal",
            "startup",
            None,
            serde_json::json!({
                "ok": true,
                "dictionary": dictionary.len(),
                "ontology": ontology_size,
                "rules": rules_size,
            }),
        );

        let (commands_tx, commands_rx) = mpsc::channel(64);
        let (flow_events_tx, flow_events_rx) = mpsc::channel(64);
        let (trigger_tx, mut trigger_rx) = mpsc::channel(8);

        tokio::spawn(debounce_loop(flow_events_rx, trigger_tx, config.debounce));
        let trigger_commands = commands_tx.clone();
        tokio::spawn(async move {
            while let Some(FlowsTrigger { reason }) = trigger_rx.recv().await {
                if trigger_commands
                    .send(Command::FlowsChanged { reason })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        if let Some(host_url) = config.host_url.clone() {
            spawn_environment_loader(
                HostClient::new(host_url),
                config.instance.clone(),
                config.env_gid.clone(),
                commands_tx.clone(),
            );
        }

        let runtime = Runtime {
            store,
            gateway: SparqlGateway::new(evaluator),
            orchestrator: Orchestrator::new(reasoner),
            translator: Translator::new(config.instance.clone()),
            flows,
            config,
            events: events.clone(),
        };
        tokio::spawn(runtime.run(commands_rx));

        RuntimeHandle {
            commands: commands_tx,
            flow_events: flow_events_tx,
            events,
            dictionary,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Health { reply } => {
                let _ = reply.send(self.store.size(None));
            }
            Command::Size { gid, reply } => {
                let _ = reply.send(self.store.size(gid.as_deref()));
            }
            Command::Graph { gid, reply } => {
                let result = self.store.find_graph(gid.as_deref()).map(|nodes| {
                    let gid =
                        gid.unwrap_or_else(|| self.store.default_graph_id().to_owned());
                    (gid, nodes)
                });
                let _ = reply.send(result.map_err(RuntimeError::from));
            }
            Command::Export { gid, reply } => {
                let _ = reply.send(self.store.export(&gid).map_err(RuntimeError::from));
            }
            Command::Node { id, gid, reply } => {
                let result = self.store.find(&id, gid.as_deref());
                let _ = reply.send(result.map_err(RuntimeError::from));
            }
            Command::Clear { gid, reply } => {
                self.store.clear(gid.as_deref());
                let _ = reply.send(self.store.size(None));
            }
            Command::Load { doc, reply } => {
                let result = self
                    .store
                    .load(&doc)
                    .map(|_| self.store.size(None))
                    .map_err(RuntimeError::from);
                let _ = reply.send(result);
            }
            Command::LoadFile { doc, reply } => {
                let _ = reply.send(self.load_file(doc));
            }
            Command::Query { sparql, reply } => {
                let result = self
                    .gateway
                    .query(&self.store, &sparql)
                    .map_err(RuntimeError::from);
                let _ = reply.send(result);
            }
            Command::RuleCreate { rule, reply } => {
                let result = self.rule_create(rule).await;
                let _ = reply.send(result);
            }
            Command::RuleUpdate { rule, reply } => {
                let result = self.rule_update(rule).await;
                let _ = reply.send(result);
            }
            Command::RuleDelete { id, reply } => {
                let result = self.rule_delete(&id).await;
                let _ = reply.send(result);
            }
            Command::LoadEnvironment { dataset } => {
                let result = self.store.load(&dataset);
                let ok = result.is_ok();
                if let Err(error) = result {
                    tracing::error!(%error, "environment graph rejected");
                }
                self.events.publish(
                    kind::ENV_LOAD,
                    "internal",
                    "startup",
                    None,
                    serde_json::json!({
                        "ok": ok,
                        "size": self.store.size(Some(&self.config.env_gid)),
                    }),
                );
            }
            Command::FlowsChanged { reason } => {
                self.reload_application(&reason).await;
            }
        }
    }

    fn load_file(&mut self, doc: Value) -> Result<LoadFileReport, RuntimeError> {
        let gid = file_graph_id(&doc).ok_or_else(|| {
            RuntimeError::Contract("loadFile document must carry an '@id'".to_owned())
        })?;
        self.store.load(&doc)?;
        Ok(LoadFileReport {
            size: self.store.size(Some(&gid)),
            total_size: self.store.size(None),
            gid,
        })
    }

    async fn rule_create(&mut self, rule: Value) -> Result<(), RuntimeError> {
        let (id, rule) = validated_rule(rule)?;
        if self.store.contains_node(&id, &self.config.rules_gid) {
            return Err(RuntimeError::Conflict(format!("rule '{id}' already exists")));
        }
        self.store.load_into(&self.config.rules_gid, &rule)?;
        self.recompute_inference("rulesChanged").await;
        Ok(())
    }

    async fn rule_update(&mut self, rule: Value) -> Result<(), RuntimeError> {
        let (id, rule) = validated_rule(rule)?;
        if !self.store.contains_node(&id, &self.config.rules_gid) {
            return Err(StoreError::NotFound(format!("rule '{id}'")).into());
        }
        self.store.remove_node(&id, &self.config.rules_gid)?;
        self.store.load_into(&self.config.rules_gid, &rule)?;
        self.recompute_inference("rulesChanged").await;
        Ok(())
    }

    async fn rule_delete(&mut self, id: &str) -> Result<(), RuntimeError> {
        if !self.store.contains_node(id, &self.config.rules_gid) {
            return Err(StoreError::NotFound(format!("rule '{id}'")).into());
        }
        self.store.remove_node(id, &self.config.rules_gid)?;
        self.recompute_inference("rulesChanged").await;
        Ok(())
    }

    /// One full change cycle: application graph replacement
    /// happens-before rule recomputation happens-before the event.
    async fn reload_application(&mut self, reason: &str) {
        let Some(flows) = self.flows.clone() else {
            tracing::warn!("flow event received but no flows source is configured");
            return;
        };
        let doc = match flows.fetch_flows().await {
            Ok(doc) => doc,
            Err(error) => {
                tracing::error!(%error, "cannot fetch flows, keeping previous application graph");
                return;
            }
        };

        let nodes = extract_nodes(&doc);
        match self.translator.translate(&nodes, &self.config.app_gid) {
            Ok(dataset) => {
                self.store.clear(Some(&self.config.app_gid));
                if let Err(error) = self.store.load(&dataset) {
                    tracing::error!(%error, "application graph load failed");
                    return;
                }
                self.events.publish(
                    kind::APP_UPDATE,
                    "internal",
                    "flows",
                    Some(reason.to_owned()),
                    serde_json::json!({
                        "ok": true,
                        "size": self.store.size(Some(&self.config.app_gid)),
                    }),
                );
            }
            Err(error) => {
                tracing::error!(%error, "flow translation failed, keeping previous graph");
                return;
            }
        }

        self.recompute_inference(reason).await;
    }

    async fn recompute_inference(&mut self, reason: &str) {
        let outcome = self.orchestrator.run(
            &mut self.store,
            &self.gateway,
            &self.config.rules_gid,
            &self.config.inferred_gid,
        );
        let response = match &outcome {
            Ok(outcome) => serde_json::json!({
                "ok": true,
                "rules": outcome.rules,
                "triples": outcome.triples,
                "reason": reason,
                "sizes": {
                    "app": self.store.size(Some(&self.config.app_gid)),
                    "inferred": self.store.size(Some(&self.config.inferred_gid)),
                },
            }),
            Err(error) => {
                tracing::error!(%error, "inference cycle failed");
                serde_json::json!({ "ok": false, "error": error.to_string(), "reason": reason })
            }
        };
        self.events
            .publish(kind::INFERENCE, "internal", "inference", None, response);
    }
}

/// The graph id a `loadFile` document names: its `@id`, or the `@id` of
/// the first graph object when the document is a dataset array.
fn file_graph_id(doc: &Value) -> Option<String> {
    match doc {
        Value::Object(object) => object
            .get("@id")
            .and_then(Value::as_str)
            .map(str::to_owned),
        Value::Array(members) => members
            .iter()
            .find_map(|member| member.get("@id").and_then(Value::as_str))
            .map(str::to_owned),
        _ => None,
    }
}

/// Rules CRUD contract: the resource must be an object carrying `@id`
/// and a `schema:text`; the rule class is added when absent.
fn validated_rule(rule: Value) -> Result<(String, Value), RuntimeError> {
    let Value::Object(mut object) = rule else {
        return Err(RuntimeError::Contract("rule must be a JSON object".to_owned()));
    };
    let id = object
        .get("@id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| RuntimeError::Contract("rule must carry an '@id'".to_owned()))?;
    if !object.contains_key(schema::TEXT) {
        return Err(RuntimeError::Contract(format!(
            "rule must carry a '{}' program",
            schema::TEXT
        )));
    }

    let types = object
        .entry("@type".to_owned())
        .or_insert_with(|| Value::Array(Vec::new()));
    match types {
        Value::Array(members) => {
            if !members.iter().any(|member| member == nrua::RULE) {
                members.push(Value::from(nrua::RULE));
            }
        }
        Value::String(single) if single.as_str() == nrua::RULE => {}
        other => {
            let single = other.clone();
            *other = Value::Array(vec![single, Value::from(nrua::RULE)]);
        }
    }

    Ok((id, Value::Object(object)))
}

fn spawn_environment_loader(
    client: HostClient,
    instance: String,
    env_gid: String,
    commands: mpsc::Sender<Command>,
) {
    tokio::spawn(async move {
        if let Err(error) = client.wait_ready().await {
            tracing::warn!(%error, "environment load abandoned");
            return;
        }
        let (settings, diagnostics) = match (client.settings().await, client.diagnostics().await)
        {
            (Ok(settings), Ok(diagnostics)) => (settings, diagnostics),
            (Err(error), _) | (_, Err(error)) => {
                tracing::warn!(%error, "environment load abandoned");
                return;
            }
        };
        let dataset = environment_dataset(&instance, &settings, &diagnostics, &env_gid);
        let _ = commands.send(Command::LoadEnvironment { dataset }).await;
    });
}
