//! Composite aggregation paging
//!
//! Drives the `monitors` aggregation one page at a time: each request carries
//! the previous response's `after_key`, and paging stops at the first response
//! without one. Rows from every page are concatenated in backend order.

use serde_json::Value;

use super::error::MonitorStatusError;
use super::query::StatusQuery;
use super::types::{AfterKey, GetMonitorStatusParams, MonitorStatusRow, MonitorsPage};
use crate::data::{SEARCH_METHOD, SearchExecutor};

/// Fetch down counts per monitor and location across all pages.
///
/// Pages are requested strictly in sequence. Any executor error or malformed
/// page aborts the whole fetch; no partial rows are returned.
pub async fn get_monitor_status(
    executor: &dyn SearchExecutor,
    params: &GetMonitorStatusParams,
) -> Result<Vec<MonitorStatusRow>, MonitorStatusError> {
    let query = StatusQuery::prepare(params)?;

    let mut rows: Vec<MonitorStatusRow> = Vec::new();
    let mut after_key: Option<AfterKey> = None;
    let mut page: u32 = 0;

    loop {
        if let Some(max_pages) = params.max_pages
            && page >= max_pages
        {
            tracing::warn!(
                max_pages,
                rows = rows.len(),
                "Backend still returning a cursor at page limit"
            );
            return Err(MonitorStatusError::PageLimitExceeded { max_pages });
        }
        page += 1;

        let request = query.request(after_key.as_ref());
        tracing::trace!(
            page,
            index = %request.index,
            after_monitor_id = ?after_key.as_ref().and_then(AfterKey::monitor_id),
            "Requesting monitor status page"
        );

        let response = executor.execute(SEARCH_METHOD, &request).await?;
        let monitors = parse_page(response, page)?;

        tracing::debug!(
            page,
            buckets = monitors.buckets.len(),
            has_more = monitors.after_key.is_some(),
            backend = executor.backend_name(),
            "Fetched monitor status page"
        );

        rows.extend(monitors.buckets.into_iter().map(MonitorStatusRow::from));

        match monitors.after_key {
            Some(next) => after_key = Some(next),
            None => break,
        }
    }

    tracing::debug!(pages = page, rows = rows.len(), "Monitor status fetch complete");
    Ok(rows)
}

/// Extract `aggregations.monitors` from a raw response
fn parse_page(mut response: Value, page: u32) -> Result<MonitorsPage, MonitorStatusError> {
    let monitors = response
        .pointer_mut("/aggregations/monitors")
        .map(Value::take)
        .ok_or_else(|| MonitorStatusError::malformed(page, "missing aggregations.monitors"))?;

    if !monitors.get("buckets").is_some_and(Value::is_array) {
        return Err(MonitorStatusError::malformed(
            page,
            "aggregations.monitors.buckets is not an array",
        ));
    }

    serde_json::from_value(monitors).map_err(|e| MonitorStatusError::malformed(page, e.to_string()))
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
