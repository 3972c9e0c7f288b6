use std::time::Duration;

/// Runtime configuration, initialized once at startup and read-only
/// afterwards. Every knob has an environment override and a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the dictionary (ZURL) file.
    pub zurl_path: String,
    /// Path of the ontology JSON-LD file.
    pub ontology_path: String,
    /// Path of the rules JSON-LD file.
    pub rules_path: String,
    /// The five named-graph identifiers.
    pub ontology_gid: String,
    pub rules_gid: String,
    pub app_gid: String,
    pub env_gid: String,
    pub inferred_gid: String,
    /// Graph receiving bare node loads.
    pub default_gid: String,
    /// Host instance id; feeds the application IRI `urn:nrua:a<instance>`.
    pub instance: String,
    /// Coalescing window for host flow events.
    pub debounce: Duration,
    /// Base URL of the host admin surface, when one is reachable.
    pub host_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zurl_path: "data/zurl.json".to_owned(),
            ontology_path: "data/ontology.jsonld".to_owned(),
            rules_path: "data/rules.jsonld".to_owned(),
            ontology_gid: "urn:graph:ontology".to_owned(),
            rules_gid: "urn:graph:rules".to_owned(),
            app_gid: "urn:graph:app".to_owned(),
            env_gid: "urn:graph:env".to_owned(),
            inferred_gid: "urn:graph:inferred".to_owned(),
            default_gid: "urn:graph:default".to_owned(),
            instance: "default".to_owned(),
            debounce: Duration::from_millis(250),
            host_url: None,
        }
    }
}

impl Config {
    /// Reads the configuration from the environment, falling back to the
    /// defaults above for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        override_from_env(&mut config.zurl_path, "URDF_ZURL");
        override_from_env(&mut config.ontology_path, "URDF_ONTOLOGY");
        override_from_env(&mut config.rules_path, "URDF_RULES");
        override_from_env(&mut config.ontology_gid, "URDF_GRAPH_ONTOLOGY");
        override_from_env(&mut config.rules_gid, "URDF_GRAPH_RULES");
        override_from_env(&mut config.app_gid, "URDF_GRAPH_APP");
        override_from_env(&mut config.env_gid, "URDF_GRAPH_ENV");
        override_from_env(&mut config.inferred_gid, "URDF_GRAPH_INFERRED");
        override_from_env(&mut config.instance, "URDF_INSTANCE");
        if let Ok(value) = std::env::var("URDF_DEBOUNCE_MS") {
            if let Ok(millis) = value.parse::<u64>() {
                config.debounce = Duration::from_millis(millis);
            }
        }
        if let Ok(value) = std::env::var("URDF_HOST_URL") {
            if !value.is_empty() {
                config.host_url = Some(value.trim_end_matches('/').to_owned());
            }
        }
        config
    }
}

fn override_from_env(slot: &mut String, variable: &str) {
    if let Ok(value) = std::env::var(variable) {
        if !value.is_empty() {
            *slot = value;
        }
    }
}
