use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub graph: GraphConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Graph source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Namespace prepended to bare local names, e.g. "http://example.com/graph#".
    pub namespace: String,
    /// Graph source kind: "docs_file" or "docs_url".
    #[serde(default = "default_source")]
    pub source: String,
    /// Path to a captured JSON array of source documents.
    #[serde(default)]
    pub docs_file: Option<PathBuf>,
    /// HTTPS URL serving the same JSON document array.
    #[serde(default)]
    pub docs_url: Option<String>,
}

/// Document-to-triples ingestion conventions
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Record attribute holding the subject identifier.
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,
    /// Local name of the type marker attached to every subject node.
    #[serde(default = "default_type_name")]
    pub type_name: String,
    /// Prefixes stripped from referenced identifiers, e.g. "pypi_".
    #[serde(default)]
    pub strip_prefixes: Vec<String>,
    /// Attributes whose values are identifier-like and get lower-cased.
    #[serde(default = "default_lowercase_attributes")]
    pub lowercase_attributes: Vec<String>,
    /// Array attribute -> [forward, inverse] predicate local names.
    /// Unmapped array attributes fall back to has_<attr> / <attr>_of.
    #[serde(default)]
    pub relations: HashMap<String, [String; 2]>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            id_attribute: default_id_attribute(),
            type_name: default_type_name(),
            strip_prefixes: Vec::new(),
            lowercase_attributes: default_lowercase_attributes(),
            relations: HashMap::new(),
        }
    }
}

/// Traversal bounds configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TraversalConfig {
    /// Ceiling on the max_depth a caller may request.
    #[serde(default = "default_max_depth_limit")]
    pub max_depth_limit: u32,
    /// Cap on literal-search matches during entrypoint resolution.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Cap on edges fetched per node during expansion.
    #[serde(default = "default_neighbor_limit")]
    pub neighbor_limit: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth_limit: default_max_depth_limit(),
            search_limit: default_search_limit(),
            neighbor_limit: default_neighbor_limit(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_source() -> String {
    "docs_file".to_string()
}

fn default_id_attribute() -> String {
    "_id".to_string()
}

fn default_type_name() -> String {
    "Entity".to_string()
}

fn default_lowercase_attributes() -> Vec<String> {
    vec!["name".to_string()]
}

fn default_max_depth_limit() -> u32 {
    10
}

fn default_search_limit() -> usize {
    25
}

fn default_neighbor_limit() -> usize {
    40
}

fn default_http_port() -> u16 {
    8080
}

fn default_allowed_origins() -> Vec<String> {
    // Default empty — set allowed_origins in config.toml for production
    vec![]
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in BOMGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("BOMGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.graph.namespace.trim().is_empty() {
            anyhow::bail!("graph.namespace must not be empty");
        }

        match self.graph.source.as_str() {
            "docs_file" => {
                if self.graph.docs_file.is_none() {
                    anyhow::bail!(
                        "graph.docs_file must be set when graph.source is \"docs_file\""
                    );
                }
            }
            "docs_url" => {
                if self.graph.docs_url.as_deref().unwrap_or("").is_empty() {
                    anyhow::bail!("graph.docs_url must be set when graph.source is \"docs_url\"");
                }
            }
            other => {
                anyhow::bail!(
                    "unknown graph.source: {} (expected \"docs_file\" or \"docs_url\")",
                    other
                );
            }
        }

        if self.ingest.id_attribute.trim().is_empty() {
            anyhow::bail!("ingest.id_attribute must not be empty");
        }

        if self.traversal.max_depth_limit == 0 {
            anyhow::bail!("traversal.max_depth_limit must be greater than 0");
        }

        if self.traversal.neighbor_limit == 0 {
            anyhow::bail!("traversal.neighbor_limit must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn create_test_config(temp_dir: &TempDir) -> String {
        let docs_file = temp_dir.path().join("records.json");
        fs::write(&docs_file, "[]").unwrap();
        let docs_file_str = docs_file.to_str().unwrap().replace('\\', "\\\\");
        format!(
            r#"
[graph]
namespace = "http://example.com/graph#"
source = "docs_file"
docs_file = "{}"

[ingest]
id_attribute = "_id"
type_name = "Library"
strip_prefixes = ["pypi_"]

[ingest.relations]
dependency_ids = ["uses_library", "used_by_library"]

[traversal]
max_depth_limit = 8
search_limit = 25
neighbor_limit = 40

[http_server]
port = 8090
"#,
            docs_file_str
        )
    }

    fn with_config_env(config_path: &std::path::Path, f: impl FnOnce()) {
        let original = std::env::var("BOMGRAPH_CONFIG").ok();
        std::env::set_var("BOMGRAPH_CONFIG", config_path.to_str().unwrap());
        f();
        std::env::remove_var("BOMGRAPH_CONFIG");
        if let Some(val) = original {
            std::env::set_var("BOMGRAPH_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_content = create_test_config(&temp_dir);
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, config_content).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.graph.namespace, "http://example.com/graph#");
            assert_eq!(config.ingest.type_name, "Library");
            assert_eq!(config.traversal.max_depth_limit, 8);
            assert_eq!(config.http_server.port, 8090);
            assert_eq!(
                config.ingest.relations["dependency_ids"],
                ["uses_library".to_string(), "used_by_library".to_string()]
            );
        });
    }

    #[test]
    fn test_config_defaults() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let docs_file = temp_dir.path().join("records.json");
        fs::write(&docs_file, "[]").unwrap();
        let minimal = format!(
            "[graph]\nnamespace = \"http://example.com/graph#\"\ndocs_file = \"{}\"\n",
            docs_file.to_str().unwrap().replace('\\', "\\\\")
        );
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, minimal).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load().unwrap();
            assert_eq!(config.ingest.id_attribute, "_id");
            assert_eq!(config.ingest.lowercase_attributes, vec!["name".to_string()]);
            assert_eq!(config.traversal.max_depth_limit, 10);
            assert_eq!(config.traversal.neighbor_limit, 40);
            assert_eq!(config.http_server.port, 8080);
        });
    }

    #[test]
    fn test_config_rejects_unknown_source() {
        let config: Config = toml::from_str(
            "[graph]\nnamespace = \"http://example.com/graph#\"\nsource = \"carrier_pigeon\"\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown graph.source"));
    }

    #[test]
    fn test_config_rejects_zero_depth_limit() {
        let config: Config = toml::from_str(
            "[graph]\nnamespace = \"http://example.com/graph#\"\ndocs_file = \"x.json\"\n\
             [traversal]\nmax_depth_limit = 0\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_depth_limit"));
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("BOMGRAPH_CONFIG").ok();
        std::env::set_var("BOMGRAPH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("BOMGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("BOMGRAPH_CONFIG", v);
        }
    }
}
