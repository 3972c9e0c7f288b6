use crate::dictionary::Dictionary;
use crate::error::StoreError;
use crate::jsonld;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A normalized JSON-LD node: `@id`, optional `@type` array, and
/// array-valued predicate entries.
pub type JsonNode = Map<String, Value>;

/// An in-memory named-graph container for normalized JSON-LD nodes.
///
/// Nodes are stored dictionary-compressed; every externally observable
/// answer ([`find`](Self::find), [`find_graph`](Self::find_graph),
/// [`export`](Self::export)) is expanded before it leaves the store. Graph
/// identifiers are kept in expanded form so lookups accept either form.
///
/// Every mutation either fully applies or leaves the store untouched:
/// incoming datasets are validated against the array-valued predicate
/// contract before the first graph is written.
pub struct QuadStore {
    dictionary: Arc<Dictionary>,
    default_graph: String,
    graphs: BTreeMap<String, BTreeMap<String, JsonNode>>,
}

impl QuadStore {
    /// Creates an empty store. Bare node loads land in `default_graph`.
    pub fn new(dictionary: Arc<Dictionary>, default_graph: impl Into<String>) -> Self {
        Self {
            dictionary,
            default_graph: default_graph.into(),
            graphs: BTreeMap::new(),
        }
    }

    /// The dictionary this store compresses through.
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// The graph id used for nodes loaded without a named graph.
    pub fn default_graph_id(&self) -> &str {
        &self.default_graph
    }

    /// Ingests a JSON-LD document with union semantics per graph.
    ///
    /// The document is flattened, checked against the array-valued
    /// predicate contract, compressed, and merged. Returns the ids of the
    /// graphs that received nodes.
    pub fn load(&mut self, doc: &Value) -> Result<Vec<String>, StoreError> {
        let flattened = jsonld::flatten(doc);
        for graph in &flattened {
            jsonld::ensure_array_valued(&graph.nodes)?;
        }

        let mut loaded = Vec::new();
        for graph in flattened {
            let gid = match graph.id {
                Some(id) => self.dictionary.expand(&id).to_owned(),
                None => self.default_graph.clone(),
            };
            self.merge_nodes(&gid, graph.nodes);
            loaded.push(gid);
        }
        Ok(loaded)
    }

    /// Ingests a document's nodes into one specific graph, ignoring any
    /// graph ids the document itself carries.
    pub fn load_into(&mut self, gid: &str, doc: &Value) -> Result<(), StoreError> {
        let flattened = jsonld::flatten(doc);
        for graph in &flattened {
            jsonld::ensure_array_valued(&graph.nodes)?;
        }
        let gid = self.dictionary.expand(gid).to_owned();
        for graph in flattened {
            self.merge_nodes(&gid, graph.nodes);
        }
        Ok(())
    }

    /// Atomically replaces one named graph with `nodes`.
    ///
    /// Validation happens before the old graph is dropped, so a rejected
    /// dataset leaves the prior state observable.
    pub fn replace(&mut self, gid: &str, nodes: Vec<JsonNode>) -> Result<(), StoreError> {
        jsonld::ensure_array_valued(&nodes)?;
        let gid = self.dictionary.expand(gid).to_owned();
        self.graphs.remove(&gid);
        self.merge_nodes(&gid, nodes);
        Ok(())
    }

    /// Removes one named graph, or every graph when `gid` is `None`.
    pub fn clear(&mut self, gid: Option<&str>) {
        match gid {
            Some(gid) => {
                let gid = self.dictionary.expand(gid).to_owned();
                self.graphs.remove(&gid);
            }
            None => self.graphs.clear(),
        }
    }

    /// Returns the expanded node with the given `@id`, searching one graph
    /// or, when `gid` is `None`, every graph in identifier order.
    pub fn find(&self, id: &str, gid: Option<&str>) -> Result<JsonNode, StoreError> {
        let key = self.dictionary.compress(id).into_owned();
        match gid {
            Some(gid) => {
                let graph = self.graph(gid)?;
                graph
                    .get(&key)
                    .map(|node| jsonld::expand_graph_node(&self.dictionary, node))
                    .ok_or_else(|| StoreError::NotFound(format!("node '{id}'")))
            }
            None => self
                .graphs
                .values()
                .find_map(|graph| graph.get(&key))
                .map(|node| jsonld::expand_graph_node(&self.dictionary, node))
                .ok_or_else(|| StoreError::NotFound(format!("node '{id}'"))),
        }
    }

    /// Returns the expanded nodes of one graph (default graph when `gid`
    /// is `None`).
    pub fn find_graph(&self, gid: Option<&str>) -> Result<Vec<JsonNode>, StoreError> {
        let graph = self.graph(gid.unwrap_or(&self.default_graph))?;
        Ok(graph
            .values()
            .map(|node| jsonld::expand_graph_node(&self.dictionary, node))
            .collect())
    }

    /// Serializes one graph as a standalone JSON-LD dataset.
    pub fn export(&self, gid: &str) -> Result<Value, StoreError> {
        let gid = self.dictionary.expand(gid).to_owned();
        let nodes = self.find_graph(Some(&gid))?;
        Ok(serde_json::json!([{ "@id": gid, "@graph": nodes }]))
    }

    /// Whether `gid` names a graph with at least one node.
    pub fn contains_graph(&self, gid: &str) -> bool {
        self.graphs.contains_key(self.dictionary.expand(gid))
    }

    /// Whether the node `id` exists within graph `gid`.
    pub fn contains_node(&self, id: &str, gid: &str) -> bool {
        let key = self.dictionary.compress(id).into_owned();
        self.graphs
            .get(self.dictionary.expand(gid))
            .is_some_and(|graph| graph.contains_key(&key))
    }

    /// Removes one node from one graph.
    pub fn remove_node(&mut self, id: &str, gid: &str) -> Result<(), StoreError> {
        let key = self.dictionary.compress(id).into_owned();
        let gid = self.dictionary.expand(gid).to_owned();
        let graph = self
            .graphs
            .get_mut(&gid)
            .ok_or_else(|| StoreError::NotFound(format!("graph '{gid}'")))?;
        graph
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("node '{id}'")))?;
        if graph.is_empty() {
            self.graphs.remove(&gid);
        }
        Ok(())
    }

    /// Triple count of one graph, or of the whole store when `gid` is
    /// `None`. Unknown graphs count as empty.
    pub fn size(&self, gid: Option<&str>) -> usize {
        match gid {
            Some(gid) => self
                .graphs
                .get(self.dictionary.expand(gid))
                .map_or(0, graph_triples),
            None => self.graphs.values().map(graph_triples).sum(),
        }
    }

    /// The expanded identifiers of every non-empty graph.
    pub fn graph_ids(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }

    /// Iterates the compressed nodes of every graph, for quad extraction.
    pub(crate) fn compressed_graphs(
        &self,
    ) -> impl Iterator<Item = (&str, impl Iterator<Item = &JsonNode>)> {
        self.graphs
            .iter()
            .map(|(gid, graph)| (gid.as_str(), graph.values()))
    }

    fn graph(&self, gid: &str) -> Result<&BTreeMap<String, JsonNode>, StoreError> {
        let gid = self.dictionary.expand(gid);
        self.graphs
            .get(gid)
            .ok_or_else(|| StoreError::NotFound(format!("graph '{gid}'")))
    }

    /// Compresses and merges nodes into a graph with union semantics.
    fn merge_nodes(&mut self, gid: &str, nodes: Vec<JsonNode>) {
        let graph = self.graphs.entry(gid.to_owned()).or_default();
        for node in nodes {
            let mut node = jsonld::compress_node(&self.dictionary, &node);
            dedupe_arrays(&mut node);
            let Some(id) = node.get("@id").and_then(Value::as_str) else {
                continue;
            };
            let id = id.to_owned();
            match graph.get_mut(&id) {
                Some(existing) => merge_node(existing, node),
                None => {
                    graph.insert(id, node);
                }
            }
        }
    }
}

/// Unions `incoming` into `existing`: new predicates are added, arrays are
/// concatenated without duplicates, and existing scalars win over
/// overwrites.
fn merge_node(existing: &mut JsonNode, incoming: JsonNode) {
    for (key, value) in incoming {
        match existing.get_mut(&key) {
            None => {
                existing.insert(key, value);
            }
            Some(Value::Array(current)) => {
                if let Value::Array(members) = value {
                    for member in members {
                        if !current.contains(&member) {
                            current.push(member);
                        }
                    }
                }
            }
            Some(_) => {}
        }
    }
}

fn dedupe_arrays(node: &mut JsonNode) {
    for (key, value) in node.iter_mut() {
        if key == "@id" {
            continue;
        }
        if let Value::Array(members) = value {
            let mut seen = Vec::with_capacity(members.len());
            for member in members.drain(..) {
                if !seen.contains(&member) {
                    seen.push(member);
                }
            }
            *members = seen;
        }
    }
}

fn graph_triples(graph: &BTreeMap<String, JsonNode>) -> usize {
    graph.values().map(jsonld::triple_count).sum()
}
