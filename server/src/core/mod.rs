//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, QueryArgs};
pub use config::{AppConfig, ElasticsearchConfig, OutputFormat, QueryConfig, RetryConfig};
