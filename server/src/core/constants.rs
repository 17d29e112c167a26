// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "heartbeat_status";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "heartbeat-status.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "HEARTBEAT_STATUS_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "HEARTBEAT_STATUS_LOG";

// =============================================================================
// Environment Variables - Elasticsearch
// =============================================================================

pub const ENV_ES_URL: &str = "HEARTBEAT_STATUS_ES_URL";
pub const ENV_ES_USER: &str = "HEARTBEAT_STATUS_ES_USER";
pub const ENV_ES_PASSWORD: &str = "HEARTBEAT_STATUS_ES_PASSWORD";
pub const ENV_ES_TIMEOUT_SECS: &str = "HEARTBEAT_STATUS_ES_TIMEOUT_SECS";

// =============================================================================
// Environment Variables - Query
// =============================================================================

/// Environment variable overriding the heartbeat index pattern
pub const ENV_HEARTBEAT_INDICES: &str = "HEARTBEAT_STATUS_INDICES";

/// Environment variable for the pagination safety cap (0 = unbounded)
pub const ENV_MAX_PAGES: &str = "HEARTBEAT_STATUS_MAX_PAGES";

/// Environment variable for retry attempts around a full status fetch
pub const ENV_RETRY_ATTEMPTS: &str = "HEARTBEAT_STATUS_RETRY_ATTEMPTS";

// =============================================================================
// Elasticsearch Defaults
// =============================================================================

/// Default Elasticsearch endpoint
pub const ES_DEFAULT_URL: &str = "http://localhost:9200";

/// Default request timeout in seconds
pub const ES_DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Query Defaults
// =============================================================================

/// Index pattern holding heartbeat documents
pub const DEFAULT_HEARTBEAT_INDICES: &str = "heartbeat-8*";

/// Default lower bound of the status window
pub const DEFAULT_TIMERANGE_FROM: &str = "now-15m";

/// Default upper bound of the status window
pub const DEFAULT_TIMERANGE_TO: &str = "now";

/// Default minimum down count a caller alerts on
pub const DEFAULT_NUM_TIMES: u32 = 5;

/// Default cap on composite aggregation pages per fetch
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

// =============================================================================
// Retry Defaults
// =============================================================================

/// Default attempts for a full status fetch (1 = no retry)
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between attempts
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 100;
