//! Core application

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::core::cli::{self, QueryArgs};
use crate::core::config::{AppConfig, OutputFormat};
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::data::{ElasticsearchClient, SearchExecutor};
use crate::domain::monitor_status::{
    DynamicSettings, GetMonitorStatusParams, MonitorStatusError, MonitorStatusRow, TimeRange,
    get_monitor_status,
};
use crate::utils::retry::retry_with_backoff_async;

pub struct CoreApp {
    pub config: AppConfig,
    pub client: ElasticsearchClient,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, query) = cli::parse();
        tracing::trace!(query = ?query, "Parsed query arguments");

        let app = Self::init(&cli_config)?;
        let rows = app.fetch(&query).await?;
        app.write_rows(&rows, &mut io::stdout().lock())
    }

    fn init(cli: &cli::CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let client = ElasticsearchClient::new(&config.elasticsearch)
            .context("Failed to initialize Elasticsearch client")?;
        Ok(Self { config, client })
    }

    /// Build fetch parameters from the query arguments and resolved config
    pub fn params(&self, query: &QueryArgs) -> GetMonitorStatusParams {
        GetMonitorStatusParams {
            dynamic_settings: DynamicSettings {
                heartbeat_indices: self.config.query.heartbeat_indices.clone(),
            },
            filters: query.filters.clone(),
            locations: query.locations.clone(),
            num_times: query.num_times,
            timerange: TimeRange::new(query.from.clone(), query.to.clone()),
            max_pages: self.config.query.max_pages,
        }
    }

    /// Run the status fetch, retrying the whole fetch on transient errors
    pub async fn fetch(&self, query: &QueryArgs) -> Result<Vec<MonitorStatusRow>> {
        fetch_with_retry(&self.client, &self.params(query), &self.config).await
    }

    fn write_rows(&self, rows: &[MonitorStatusRow], out: &mut impl Write) -> Result<()> {
        write_rows(rows, self.config.format, out)
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_writer(io::stderr)
            .with_env_filter(filter)
            .init();
    }
}

async fn fetch_with_retry(
    executor: &dyn SearchExecutor,
    params: &GetMonitorStatusParams,
    config: &AppConfig,
) -> Result<Vec<MonitorStatusRow>> {
    let result = retry_with_backoff_async(
        config.retry.max_attempts,
        config.retry.base_delay_ms,
        MonitorStatusError::is_transient,
        || get_monitor_status(executor, params),
    )
    .await;

    match result {
        Ok((rows, attempts)) => {
            tracing::info!(rows = rows.len(), attempts, "Monitor status fetched");
            Ok(rows)
        }
        Err((e, attempts)) => Err(e).with_context(|| {
            format!("Monitor status fetch failed after {} attempt(s)", attempts)
        }),
    }
}

/// Serialize rows to `out` in the requested format
fn write_rows(
    rows: &[MonitorStatusRow],
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows).context("Failed to serialize rows")?;
            writeln!(out)?;
        }
        OutputFormat::Jsonl => {
            for row in rows {
                serde_json::to_writer(&mut *out, row).context("Failed to serialize row")?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}
