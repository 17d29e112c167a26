//! Monitor status error types

use thiserror::Error;

use crate::data::SearchError;

#[derive(Error, Debug)]
pub enum MonitorStatusError {
    /// The search executor failed; propagated as-is
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    /// The caller's filter fragment is not a usable bool query
    #[error("Invalid filters: {0}")]
    InvalidFilters(String),

    /// Response is missing the `monitors` aggregation or has the wrong shape
    #[error("Malformed search response on page {page}: {reason}")]
    MalformedResponse { page: u32, reason: String },

    /// Backend kept returning a cursor past the configured cap
    #[error("Pagination exceeded {max_pages} pages without exhausting the cursor")]
    PageLimitExceeded { max_pages: u32 },
}

impl MonitorStatusError {
    pub fn malformed(page: u32, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            page,
            reason: reason.into(),
        }
    }

    /// Check if retrying the whole fetch might succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Search(e) if e.is_transient())
    }
}
