//! Data access layer
//!
//! - `search` - Search backend contract (`SearchExecutor`) and the Elasticsearch client
//! - `error` - Backend error type

pub mod error;
pub mod search;

pub use error::SearchError;
pub use search::{ElasticsearchClient, SEARCH_METHOD, SearchExecutor, SearchRequest};
