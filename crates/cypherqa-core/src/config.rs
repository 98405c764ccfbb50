use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::{env, fs};

pub const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";
pub const DEFAULT_QUESTION: &str = "What investment firms are near Santa Clara?";
pub const DEFAULT_MOVIES_QUESTION: &str =
    "Which director has directed both Florence Pernel and Jerzy Stuhr, but not necessarily in the same movie?";
pub const DEFAULT_MOVIES_CSV: &str =
    "https://raw.githubusercontent.com/tomasonjo/blog-datasets/main/movies/movies_small.csv";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub name: String,
    pub engine: String,
    pub connection: ConnectionConfig,
    pub parameters: HashMap<String, serde_json::Value>,
    pub timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut parameters = HashMap::new();
        parameters.insert("modelName".to_string(), Value::from(DEFAULT_MODEL));
        parameters.insert("temperature".to_string(), Value::from(0.0));
        EngineConfig {
            name: "groq".to_string(),
            engine: "groq".to_string(),
            connection: ConnectionConfig::default(),
            parameters,
            timeout_secs: None,
        }
    }
}

impl EngineConfig {
    pub fn model_name(&self) -> Option<&str> {
        self.parameters.get("modelName").and_then(Value::as_str)
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.parameters
            .get("bearer_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Neo4jConfig {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
            database: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ConnectionConfig {
    pub protocol: String,
    pub hostname: String,
    pub port: u16,
    pub request_path: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            protocol: "https".to_string(),
            hostname: "api.groq.com".to_string(),
            port: 443,
            request_path: "/openai/v1/chat/completions".to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Full endpoint URL, validated.
    pub fn url(&self) -> Result<url::Url> {
        if !matches!(self.protocol.as_str(), "http" | "https") {
            return Err(anyhow!(
                "Invalid protocol: {}. Only http and https are allowed",
                self.protocol
            ));
        }
        let raw = format!(
            "{}://{}:{}{}",
            self.protocol, self.hostname, self.port, self.request_path
        );
        url::Url::parse(&raw).with_context(|| format!("Invalid endpoint URL: {}", raw))
    }
}

/// Settings for the question answering chain itself.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ChainConfig {
    /// Rows kept from a query result.
    pub top_k: usize,
    /// Skip the answer stage and display the rows.
    pub return_direct: bool,
    /// Refuse statements that write to the database.
    pub read_only: bool,
    pub wrap_width: usize,
    pub examples_file: Option<String>,
    /// Use the movie few-shot set when no examples file is given.
    pub movie_examples: bool,
    pub template_file: Option<String>,
    pub default_question: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            top_k: 10,
            return_direct: false,
            read_only: false,
            wrap_width: 60,
            examples_file: None,
            movie_examples: false,
            template_file: None,
            default_question: DEFAULT_QUESTION.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub neo4j: Neo4jConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub chain: ChainConfig,
}

impl Config {
    /// Overlay the recognised environment variables on top of this config.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| env::var(key).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("NEO4J_URI") {
            self.neo4j.uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USERNAME") {
            self.neo4j.user = user;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.neo4j.password = password;
        }
        if let Some(database) = lookup("NEO4J_DATABASE").filter(|db| !db.is_empty()) {
            self.neo4j.database = Some(database);
        }
        if let Some(key) = lookup("GROQ_API_KEY") {
            debug!("Using completion API key from environment (length: {})", key.len());
            self.engine
                .parameters
                .insert("bearer_token".to_string(), Value::String(key));
        }
        if let Some(model) = lookup("CYPHERQA_MODEL") {
            self.engine
                .parameters
                .insert("modelName".to_string(), Value::String(model));
        }
    }
}

pub trait VariableResolver {
    fn is_resolvable(&self, key: &str) -> bool;
    fn resolve(&self, key: &str) -> Result<String>;
}

pub struct EnvVarResolver {}

impl VariableResolver for EnvVarResolver {
    fn is_resolvable(&self, key: &str) -> bool {
        // Support both ENV_ prefix and ${VAR} syntax for flexibility
        key.starts_with("ENV_") || (key.starts_with("${") && key.ends_with('}'))
    }
    fn resolve(&self, key: &str) -> Result<String> {
        let env_key = if let Some(name) = key.strip_prefix("ENV_") {
            name
        } else if let Some(name) = key.strip_prefix("${").and_then(|k| k.strip_suffix('}')) {
            name
        } else {
            return Err(anyhow!("Invalid environment variable format: {}", key));
        };

        debug!("Looking up environment variable: {}", env_key);
        env::var(env_key)
            .map_err(|e| anyhow!("Failed to find environment variable '{}': {}", env_key, e))
    }
}

pub struct VariableResolverProcessor {
    resolvers: Vec<Arc<dyn VariableResolver>>,
}

impl Default for VariableResolverProcessor {
    fn default() -> Self {
        VariableResolverProcessor {
            resolvers: vec![Arc::new(EnvVarResolver {})],
        }
    }
}

impl VariableResolverProcessor {
    pub fn resolve(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::String(s) => {
                for resolver in &self.resolvers {
                    if resolver.is_resolvable(s) {
                        *s = resolver.resolve(s)?;
                        return Ok(());
                    }
                }
                Ok(())
            }
            Value::Object(map) => {
                for (_, v) in map.iter_mut() {
                    self.resolve(v)?;
                }
                Ok(())
            }
            Value::Array(arr) => {
                for item in arr.iter_mut() {
                    self.resolve(item)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Parse a YAML (or JSON) config document, resolving `ENV_`/`${}` values.
/// The document is layered over the defaults: sections and parameter maps
/// are merged key by key, so a file may set only what it changes.
pub fn parse_config(config_content: &str) -> Result<Config> {
    let mut document: Value =
        serde_yaml::from_str(config_content).context("Could not parse config document")?;
    if document.is_null() {
        return Ok(Config::default());
    }
    if !document.is_object() {
        return Err(anyhow!("Config document must be a mapping"));
    }
    VariableResolverProcessor::default().resolve(&mut document)?;

    let mut config = serde_json::to_value(Config::default()).context("Could not encode default config")?;
    merge_values(&mut config, document);
    serde_json::from_value(config).context("Could not parse config")
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Build the effective configuration: defaults, then the optional file, then
/// the environment, then `key=value` overrides on engine parameters.
pub fn load_config(config_path: Option<&Path>, overrides: &HashMap<String, String>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            parse_config(&content)?
        }
        None => Config::default(),
    };

    config.apply_env();

    let overrides: HashMap<String, Value> = overrides
        .iter()
        .map(|(k, v)| (k.clone(), parse_override_value(v)))
        .collect();
    apply_variable_overrider(&mut config.engine.parameters, &overrides)?;

    Ok(config)
}

fn parse_override_value(v: &str) -> Value {
    if let Ok(b) = v.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = v.parse::<i64>() {
        return Value::from(i);
    }
    match v.parse::<f64>() {
        Ok(f) => match serde_json::Number::from_f64(f) {
            Some(num) => Value::Number(num),
            None => {
                debug!("Invalid f64 override value: {}, treating as string", f);
                Value::String(v.to_string())
            }
        },
        _ => Value::String(v.to_string()),
    }
}

fn apply_variable_overrider(
    parameters: &mut HashMap<String, Value>,
    overrides: &HashMap<String, Value>,
) -> Result<()> {
    for (key, value) in overrides {
        let mut keys = key.split('.');
        let Some(head) = keys.next() else { continue };
        let rest: Vec<&str> = keys.collect();
        if rest.is_empty() {
            parameters.insert(head.to_string(), value.clone());
            continue;
        }

        let mut current = parameters
            .entry(head.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()))
            .as_object_mut()
            .ok_or_else(|| anyhow!("Override '{}' targets a non-object parameter", key))?;
        for (i, part) in rest.iter().enumerate() {
            if i + 1 == rest.len() {
                current.insert(part.to_string(), value.clone());
            } else {
                current = current
                    .entry(part.to_string())
                    .or_insert_with(|| Value::Object(serde_json::Map::new()))
                    .as_object_mut()
                    .ok_or_else(|| anyhow!("Failed to create nested object"))?;
            }
        }
    }
    Ok(())
}

pub fn parse_key_value_pair(pair: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = pair.splitn(2, '=').collect();
    if parts.len() == 2 {
        Some((parts[0].to_string(), parts[1].to_string()))
    } else {
        None
    }
}
