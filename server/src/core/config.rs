use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_HEARTBEAT_INDICES, DEFAULT_MAX_PAGES, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_BASE_DELAY_MS, ES_DEFAULT_TIMEOUT_SECS, ES_DEFAULT_URL,
};

// =============================================================================
// Output Format Enum
// =============================================================================

/// How status rows are written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Single pretty-printed JSON array
    #[default]
    Json,
    /// One JSON object per line
    Jsonl,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

// =============================================================================
// File Config (all fields optional, merged over defaults)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElasticsearchFileConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryFileConfig {
    pub heartbeat_indices: Option<String>,
    pub max_pages: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryFileConfig {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub elasticsearch: Option<ElasticsearchFileConfig>,
    pub query: Option<QueryFileConfig>,
    pub retry: Option<RetryFileConfig>,
    pub format: Option<OutputFormat>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Runtime Config
// =============================================================================

/// Elasticsearch connection configuration
#[derive(Clone)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl fmt::Debug for ElasticsearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElasticsearchConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: ES_DEFAULT_URL.to_string(),
            user: None,
            password: None,
            timeout_secs: ES_DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Query-shaping configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub heartbeat_indices: String,
    /// None = unbounded pagination
    pub max_pages: Option<u32>,
}

/// Retry policy applied by the caller around a full fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub elasticsearch: ElasticsearchConfig,
    pub query: QueryConfig,
    pub retry: RetryConfig,
    pub format: OutputFormat,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Priority (later overrides earlier):
    /// 1. Defaults
    /// 2. Local `heartbeat-status.json` OR CLI-specified config path
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?redacted(cli), "CLI config");

        let path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                config
            }
            None => FileConfig::default(),
        };

        let config = Self::resolve(cli, file_config);
        tracing::debug!(
            url = %config.elasticsearch.url,
            index = %config.query.heartbeat_indices,
            max_pages = ?config.query.max_pages,
            retry_attempts = config.retry.max_attempts,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Merge CLI values over file values over defaults
    fn resolve(cli: &CliConfig, file: FileConfig) -> Self {
        let file_es = file.elasticsearch.unwrap_or_default();
        let defaults = ElasticsearchConfig::default();
        let elasticsearch = ElasticsearchConfig {
            url: cli.es_url.clone().or(file_es.url).unwrap_or(defaults.url),
            user: cli.es_user.clone().or(file_es.user),
            password: cli.es_password.clone().or(file_es.password),
            timeout_secs: cli
                .es_timeout_secs
                .or(file_es.timeout_secs)
                .unwrap_or(defaults.timeout_secs),
        };

        let file_query = file.query.unwrap_or_default();
        let max_pages = cli
            .max_pages
            .or(file_query.max_pages)
            .unwrap_or(DEFAULT_MAX_PAGES);
        let query = QueryConfig {
            heartbeat_indices: cli
                .heartbeat_indices
                .clone()
                .or(file_query.heartbeat_indices)
                .unwrap_or_else(|| DEFAULT_HEARTBEAT_INDICES.to_string()),
            max_pages: (max_pages > 0).then_some(max_pages),
        };

        let file_retry = file.retry.unwrap_or_default();
        let retry = RetryConfig {
            max_attempts: cli
                .retry_attempts
                .or(file_retry.max_attempts)
                .unwrap_or(DEFAULT_RETRY_ATTEMPTS)
                .max(1),
            base_delay_ms: file_retry
                .base_delay_ms
                .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
        };

        Self {
            elasticsearch,
            query,
            retry,
            format: cli.format.or(file.format).unwrap_or_default(),
        }
    }
}

fn redacted(cli: &CliConfig) -> CliConfig {
    CliConfig {
        es_password: cli.es_password.as_ref().map(|_| "***".to_string()),
        ..cli.clone()
    }
}
