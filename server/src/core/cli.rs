use clap::Parser;

use std::path::PathBuf;

use super::config::OutputFormat;
use super::constants::{
    DEFAULT_NUM_TIMES, DEFAULT_TIMERANGE_FROM, DEFAULT_TIMERANGE_TO, ENV_CONFIG, ENV_ES_PASSWORD,
    ENV_ES_TIMEOUT_SECS, ENV_ES_URL, ENV_ES_USER, ENV_HEARTBEAT_INDICES, ENV_MAX_PAGES,
    ENV_RETRY_ATTEMPTS,
};

#[derive(Parser)]
#[command(name = "heartbeat-status")]
#[command(
    version,
    about = "Down status of heartbeat monitors per location",
    long_about = None
)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Elasticsearch URL
    #[arg(long, env = ENV_ES_URL)]
    pub es_url: Option<String>,

    /// Elasticsearch username (basic auth)
    #[arg(long, env = ENV_ES_USER)]
    pub es_user: Option<String>,

    /// Elasticsearch password (basic auth)
    #[arg(long, env = ENV_ES_PASSWORD, hide_env_values = true)]
    pub es_password: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = ENV_ES_TIMEOUT_SECS)]
    pub es_timeout_secs: Option<u64>,

    /// Heartbeat index pattern
    #[arg(long, env = ENV_HEARTBEAT_INDICES)]
    pub heartbeat_indices: Option<String>,

    /// Start of the window (date math, e.g. now-15m)
    #[arg(long, default_value = DEFAULT_TIMERANGE_FROM)]
    pub from: String,

    /// End of the window (date math, e.g. now)
    #[arg(long, default_value = DEFAULT_TIMERANGE_TO)]
    pub to: String,

    /// Serialized bool query fragment applied as an extra disjunction
    #[arg(long)]
    pub filters: Option<String>,

    /// Observer location to include (repeatable)
    #[arg(long = "location", short = 'l')]
    pub locations: Vec<String>,

    /// Minimum down count the caller alerts on (passed through)
    #[arg(long, default_value_t = DEFAULT_NUM_TIMES)]
    pub num_times: u32,

    /// Maximum composite aggregation pages (0 = unbounded)
    #[arg(long, env = ENV_MAX_PAGES)]
    pub max_pages: Option<u32>,

    /// Attempts for the whole fetch on transient errors
    #[arg(long, env = ENV_RETRY_ATTEMPTS)]
    pub retry_attempts: Option<u32>,

    /// Output format (json or jsonl)
    #[arg(long, value_parser = parse_output_format)]
    pub format: Option<OutputFormat>,
}

/// Parse output format from CLI string
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "json" => Ok(OutputFormat::Json),
        "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
        _ => Err(format!(
            "Invalid output format '{}'. Valid options: json, jsonl",
            s
        )),
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub es_url: Option<String>,
    pub es_user: Option<String>,
    pub es_password: Option<String>,
    pub es_timeout_secs: Option<u64>,
    pub heartbeat_indices: Option<String>,
    pub max_pages: Option<u32>,
    pub retry_attempts: Option<u32>,
    pub format: Option<OutputFormat>,
}

/// The status query requested on the command line
#[derive(Debug, Clone)]
pub struct QueryArgs {
    pub from: String,
    pub to: String,
    pub filters: Option<String>,
    pub locations: Vec<String>,
    pub num_times: u32,
}

/// Parse CLI arguments and split them into config and query
pub fn parse() -> (CliConfig, QueryArgs) {
    split(Cli::parse())
}

fn split(cli: Cli) -> (CliConfig, QueryArgs) {
    let config = CliConfig {
        config: cli.config,
        es_url: cli.es_url,
        es_user: cli.es_user,
        es_password: cli.es_password,
        es_timeout_secs: cli.es_timeout_secs,
        heartbeat_indices: cli.heartbeat_indices,
        max_pages: cli.max_pages,
        retry_attempts: cli.retry_attempts,
        format: cli.format,
    };
    let query = QueryArgs {
        from: cli.from,
        to: cli.to,
        filters: cli.filters,
        locations: cli.locations,
        num_times: cli.num_times,
    };
    (config, query)
}
