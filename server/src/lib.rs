//! Down status of heartbeat monitors, aggregated per monitor and location
//!
//! - `core` - CLI, configuration, and application wiring
//! - `data` - Search backend contract and Elasticsearch client
//! - `domain` - Query building and composite aggregation paging
//! - `utils` - Shared helpers

mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
