//! The best-effort event channel (`urdf/events`).

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Event types emitted on the channel.
pub mod kind {
    pub const APP_UPDATE: &str = "appUpdate";
    pub const CLEAR: &str = "clear";
    pub const ENV_LOAD: &str = "envLoad";
    pub const GRAPH: &str = "graph";
    pub const HEALTH: &str = "health";
    pub const INFERENCE: &str = "inference";
    pub const LOAD: &str = "load";
    pub const LOAD_FILE: &str = "loadFile";
    pub const NODE: &str = "node";
    pub const QUERY: &str = "query";
    pub const RULES: &str = "rules";
    pub const SIZE: &str = "size";
    pub const STARTUP_LOAD: &str = "startupLoad";
}

/// A structured event describing one request or runtime cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub ts: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub request: RequestInfo,
    pub response: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Milliseconds since the Unix epoch, the timestamp carried by every
/// response and event.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Fan-out sender for runtime events. Publication is best-effort: a
/// channel without subscribers (or a lagging subscriber) never affects
/// the store or the orchestrator.
#[derive(Debug, Clone)]
pub struct EventChannel {
    sender: broadcast::Sender<Event>,
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes one event, swallowing delivery failures.
    pub fn publish(
        &self,
        kind: &str,
        method: &str,
        path: &str,
        summary: Option<String>,
        response: Value,
    ) {
        let event = Event {
            ts: now_millis(),
            kind: kind.to_owned(),
            request: RequestInfo {
                method: method.to_owned(),
                path: path.to_owned(),
                summary,
            },
            response,
        };
        let _ = self.sender.send(event);
    }

    /// Opens a subscription to the channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}
