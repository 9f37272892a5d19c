// Configuration for router navigation.
// Read from an rpcnav.json at the repo root (or --config), every field
// optional with defaults matching common tRPC conventions.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "rpcnav.json";

/// Explicit root-router pointer. Relative `file_path` resolves against the
/// directory containing the configuration file, not the process cwd.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterPointer {
    pub file_path: PathBuf,
    pub variable_name: String,
}

/// Literal token sets used by the classifier and client-type resolver in
/// place of hardcoded defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Patterns {
    /// Builder methods that terminate a procedure chain.
    pub procedure_types: Vec<String>,
    /// Router-registration function names (matched against the callee's
    /// final path segment).
    pub router_functions: Vec<String>,
    /// Client factory functions that carry the router type argument.
    pub client_initializers: Vec<String>,
    /// Hook exposing client utilities; participates in client-call
    /// recognition for hover.
    pub utils_method: String,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            procedure_types: vec![
                "query".to_string(),
                "mutation".to_string(),
                "subscription".to_string(),
            ],
            router_functions: vec![
                "router".to_string(),
                "createRouter".to_string(),
                "createTRPCRouter".to_string(),
            ],
            client_initializers: vec![
                "createTRPCReact".to_string(),
                "createTRPCNext".to_string(),
                "createTRPCProxyClient".to_string(),
                "createTRPCClient".to_string(),
            ],
            utils_method: "useUtils".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavConfig {
    /// Explicit locator mode; takes precedence over auto-discovery.
    pub router: Option<RouterPointer>,
    /// Directory root for auto-discovery; defaults to the repo root.
    pub router_root: Option<PathBuf>,
    /// Identifier searched for at discovery entry points.
    pub main_router_name: String,
    /// Canonical client-variable prefix for batch-mode lookup keys.
    pub api_variable_name: String,
    /// Optional literal name-prefix that forces procedure classification.
    pub procedure_pattern: Option<String>,
    /// Recursion bound for tree walking.
    pub max_depth: usize,
    /// Staleness window for the batch path map.
    pub cache_timeout_ms: u64,
    pub patterns: Patterns,
    /// File suffixes that participate in scanning.
    pub file_extensions: Vec<String>,
    /// Directory the config file was loaded from; anchor for relative
    /// router paths. Not part of the JSON surface.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            router: None,
            router_root: None,
            main_router_name: "appRouter".to_string(),
            api_variable_name: "api".to_string(),
            procedure_pattern: None,
            max_depth: 10,
            cache_timeout_ms: 30_000,
            patterns: Patterns::default(),
            file_extensions: vec![
                "ts".to_string(),
                "tsx".to_string(),
                "js".to_string(),
                "jsx".to_string(),
            ],
            base_dir: PathBuf::from("."),
        }
    }
}

impl NavConfig {
    /// Load configuration for a repo. An explicit path must exist; the
    /// conventional rpcnav.json is optional and absence means defaults.
    pub fn load(repo_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    repo_root.join(path)
                }
            }
            None => {
                let candidate = repo_root.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    let mut config = Self::default();
                    config.base_dir = repo_root.to_path_buf();
                    return Ok(config);
                }
                candidate
            }
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config: NavConfig = serde_json::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(|parent| parent.to_path_buf())
            .unwrap_or_else(|| repo_root.to_path_buf());
        Ok(config)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    /// Resolve the auto-discovery root against the config directory.
    pub fn discovery_root(&self) -> PathBuf {
        match &self.router_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => self.base_dir.join(root),
            None => self.base_dir.clone(),
        }
    }
}
