//! Monitor status parameters, wire shapes, and output rows

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::constants::DEFAULT_HEARTBEAT_INDICES;

// ============================================================================
// Parameters
// ============================================================================

/// Time window in backend date math (`now-10m`, ISO timestamps, ...)
///
/// Passed through to the range filter verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl TimeRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Settings resolved at runtime rather than compiled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSettings {
    pub heartbeat_indices: String,
}

impl Default for DynamicSettings {
    fn default() -> Self {
        Self {
            heartbeat_indices: DEFAULT_HEARTBEAT_INDICES.to_string(),
        }
    }
}

/// Parameters for one status fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMonitorStatusParams {
    pub dynamic_settings: DynamicSettings,
    /// Serialized bool query fragment, e.g. built from a monitor id list
    pub filters: Option<String>,
    /// Observer locations; ignored when `filters` is present
    pub locations: Vec<String>,
    /// Minimum down count the caller alerts on. Not applied to the query.
    pub num_times: u32,
    pub timerange: TimeRange,
    /// Fail instead of paging past this many pages. None = unbounded.
    pub max_pages: Option<u32>,
}

impl GetMonitorStatusParams {
    pub fn new(timerange: TimeRange) -> Self {
        Self {
            dynamic_settings: DynamicSettings::default(),
            filters: None,
            locations: Vec::new(),
            num_times: 0,
            timerange,
            max_pages: None,
        }
    }

    /// The filter fragment, treating blank strings as absent
    pub fn raw_filters(&self) -> Option<&str> {
        self.filters
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }
}

// ============================================================================
// Wire shapes
// ============================================================================

/// Composite aggregation cursor
///
/// Opaque: forwarded unmodified as `after` in the next request. The accessors
/// exist for logging only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AfterKey(Map<String, Value>);

impl AfterKey {
    pub fn monitor_id(&self) -> Option<&str> {
        self.0.get("monitor_id").and_then(Value::as_str)
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    pub fn location(&self) -> Option<&str> {
        self.0.get("location").and_then(Value::as_str)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for AfterKey {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Composite key of one bucket. `location` is null for the missing bucket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonitorBucketKey {
    pub monitor_id: String,
    pub status: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// One grouped result from the `monitors` aggregation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonitorBucket {
    pub key: MonitorBucketKey,
    pub doc_count: u64,
}

/// Body of `aggregations.monitors` for one page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonitorsPage {
    pub buckets: Vec<MonitorBucket>,
    #[serde(default)]
    pub after_key: Option<AfterKey>,
}

// ============================================================================
// Output
// ============================================================================

/// Down count for one monitor at one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatusRow {
    pub monitor_id: String,
    pub status: String,
    pub location: Option<String>,
    pub count: u64,
}

impl From<MonitorBucket> for MonitorStatusRow {
    fn from(bucket: MonitorBucket) -> Self {
        Self {
            monitor_id: bucket.key.monitor_id,
            status: bucket.key.status,
            location: bucket.key.location,
            count: bucket.doc_count,
        }
    }
}
