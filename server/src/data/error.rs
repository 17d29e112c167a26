//! Error type for search backend calls

use thiserror::Error;

/// Maximum number of response body bytes kept in a status error
const MAX_ERROR_BODY_LEN: usize = 512;

/// Error returned by a search backend
#[derive(Error, Debug)]
pub enum SearchError {
    /// Transport-level failure (connect, timeout, decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Search backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Executor asked to run something other than a search
    #[error("Unsupported search method: {0}")]
    UnsupportedMethod(String),

    /// Client could not be built from the given settings
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    /// Create a status error, truncating oversized bodies
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_ERROR_BODY_LEN {
            let mut end = MAX_ERROR_BODY_LEN;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
            body.push_str("...");
        }
        Self::Status { status, body }
    }

    /// Check if retrying the same request might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::UnsupportedMethod(_) | Self::Config(_) => false,
        }
    }
}
