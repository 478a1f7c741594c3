use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// "api_key" or "basic".
    #[serde(default = "default_auth_type")]
    pub auth_type: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub shared_key: String,
    /// Full ingestion URL override. When empty the URL is derived from
    /// workspace_id and the public ingestion domain.
    #[serde(default)]
    pub ingestion_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablesConfig {
    #[serde(default = "default_ip_table")]
    pub ip: String,
    #[serde(default = "default_ip_foundation_table")]
    pub ip_foundation: String,
    #[serde(default = "default_domain_table")]
    pub domain: String,
    #[serde(default = "default_account_usage_table")]
    pub account_usage: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Directory holding one checkpoint file per indicator kind.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,
    /// Comma-separated static indicator lists, processed on every run in
    /// addition to any configured watchlist.
    #[serde(default)]
    pub ip_values: String,
    #[serde(default)]
    pub domain_values: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            auth_type: default_auth_type(),
            api_key: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            workspace_id: String::new(),
            shared_key: String::new(),
            ingestion_url: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            ip: default_ip_table(),
            ip_foundation: default_ip_foundation_table(),
            domain: default_domain_table(),
            account_usage: default_account_usage_table(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            ip_values: String::new(),
            domain_values: String::new(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://scout.cymru.com".to_string()
}

fn default_auth_type() -> String {
    "api_key".to_string()
}

fn default_timeout_seconds() -> f64 {
    30.0
}

fn default_ip_table() -> String {
    "Scout_IP_Data".to_string()
}

fn default_ip_foundation_table() -> String {
    "Scout_IP_Foundation_Data".to_string()
}

fn default_domain_table() -> String {
    "Scout_Domain_Data".to_string()
}

fn default_account_usage_table() -> String {
    "Scout_Account_Usage_Data".to_string()
}

fn default_state_dir() -> String {
    "~/.scout-relay/state".to_string()
}

pub fn expand_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{}", home.to_string_lossy(), stripped);
        }
    }
    path.to_string()
}

fn home_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".scout-relay").join("config.toml"))
}

fn repo_default_config_path() -> PathBuf {
    PathBuf::from("config/scout-relay.toml")
}

fn resolve_config_path_with_overrides(
    raw_path: Option<PathBuf>,
    env_keys: &[&str],
    home_path: Option<PathBuf>,
    repo_default: PathBuf,
) -> PathBuf {
    if let Some(path) = raw_path {
        return path;
    }

    for key in env_keys {
        if let Ok(value) = std::env::var(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
    }

    if let Some(path) = home_path {
        if path.exists() {
            return path;
        }
    }

    if repo_default.exists() {
        return repo_default;
    }

    home_config_path().unwrap_or(repo_default)
}

pub fn resolve_config_path(raw_path: Option<PathBuf>) -> PathBuf {
    resolve_config_path_with_overrides(
        raw_path,
        &["SCOUT_CONFIG"],
        home_config_path(),
        repo_default_config_path(),
    )
}

fn normalize_config(mut cfg: AppConfig) -> AppConfig {
    cfg.ingest.state_dir = expand_path(&cfg.ingest.state_dir);
    cfg.api.base_url = cfg.api.base_url.trim_end_matches('/').to_string();
    cfg
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("failed to read config {}", path.as_ref().display()))?;
    let cfg: AppConfig = toml::from_str(&content).context("failed to parse TOML config")?;
    Ok(normalize_config(cfg))
}
