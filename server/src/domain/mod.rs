//! Domain logic for heartbeat monitoring
//!
//! - `monitor_status` - Paged down-status aggregation per monitor and location

pub mod monitor_status;

pub use monitor_status::{GetMonitorStatusParams, MonitorStatusRow, get_monitor_status};
