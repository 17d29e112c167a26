//! Down status of monitors per observer location
//!
//! - `query` - Builds one composite aggregation request per page
//! - `fetch` - Pages through the aggregation and flattens the buckets
//! - `types` - Parameters, wire shapes, and output rows
//! - `error` - Error type for the whole fetch

pub mod error;
pub mod fetch;
pub mod query;
pub mod types;

pub use error::MonitorStatusError;
pub use fetch::get_monitor_status;
pub use query::{StatusQuery, build_status_request};
pub use types::{AfterKey, DynamicSettings, GetMonitorStatusParams, MonitorStatusRow, TimeRange};
