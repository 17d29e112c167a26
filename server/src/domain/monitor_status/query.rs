//! Search request builder for the monitor status query
//!
//! Every page uses the same `monitors` composite aggregation; only the filter
//! clauses (fixed per fetch) and the `after` cursor (per page) vary.

use serde_json::{Map, Value, json};

use super::error::MonitorStatusError;
use super::types::{AfterKey, GetMonitorStatusParams};
use crate::data::SearchRequest;

/// Buckets per composite aggregation page
pub const COMPOSITE_PAGE_SIZE: u32 = 2000;

/// Status value the query counts
pub const DOWN_STATUS: &str = "down";

/// Heartbeat document fields
pub mod fields {
    pub const MONITOR_ID: &str = "monitor.id";
    pub const MONITOR_STATUS: &str = "monitor.status";
    pub const OBSERVER_LOCATION: &str = "observer.geo.name";
    pub const TIMESTAMP: &str = "@timestamp";
}

/// One entry of the top-level `bool.filter` array
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause<'a> {
    /// `{"term": {field: value}}`
    Term { field: &'static str, value: &'a str },
    /// Inclusive range on both ends
    Range {
        field: &'static str,
        gte: &'a str,
        lte: &'a str,
    },
    /// Field equals any of the values (OR of terms)
    AnyOf {
        field: &'static str,
        values: &'a [String],
    },
}

impl FilterClause<'_> {
    pub fn to_query(&self) -> Value {
        match self {
            Self::Term { field, value } => json!({ "term": { (*field): value } }),
            Self::Range { field, gte, lte } => {
                json!({ "range": { (*field): { "gte": gte, "lte": lte } } })
            }
            Self::AnyOf { field, values } => {
                let should: Vec<Value> = values
                    .iter()
                    .map(|v| json!({ "term": { (*field): v } }))
                    .collect();
                json!({ "bool": { "should": should } })
            }
        }
    }
}

/// Build the AND-ed filter clauses.
///
/// Locations only apply when no filter fragment was given; the fragment takes
/// precedence and is merged separately.
pub fn build_filter_clauses<'a>(
    params: &'a GetMonitorStatusParams,
    has_fragment: bool,
) -> Vec<FilterClause<'a>> {
    let mut clauses = vec![
        FilterClause::Term {
            field: fields::MONITOR_STATUS,
            value: DOWN_STATUS,
        },
        FilterClause::Range {
            field: fields::TIMESTAMP,
            gte: &params.timerange.from,
            lte: &params.timerange.to,
        },
    ];

    if !has_fragment && !params.locations.is_empty() {
        clauses.push(FilterClause::AnyOf {
            field: fields::OBSERVER_LOCATION,
            values: &params.locations,
        });
    }

    clauses
}

/// Parse the serialized filter fragment and return its `bool` body
pub fn parse_filters(filters: &str) -> Result<Map<String, Value>, MonitorStatusError> {
    let value: Value = serde_json::from_str(filters)
        .map_err(|e| MonitorStatusError::InvalidFilters(format!("not valid JSON: {}", e)))?;

    match value {
        Value::Object(mut obj) => match obj.remove("bool") {
            Some(Value::Object(bool_query)) => Ok(bool_query),
            _ => Err(MonitorStatusError::InvalidFilters(
                "expected an object with a `bool` query".to_string(),
            )),
        },
        _ => Err(MonitorStatusError::InvalidFilters(
            "expected a JSON object".to_string(),
        )),
    }
}

/// Merge the fragment's bool keys into the top-level bool query.
///
/// The fragment's `should`/`minimum_should_match` become the outer disjunction.
/// Any `filter` it carries is appended so the base clauses survive.
fn merge_fragment(bool_query: &mut Map<String, Value>, fragment: Map<String, Value>) {
    for (key, value) in fragment {
        if key == "filter" {
            if let Some(Value::Array(base)) = bool_query.get_mut("filter") {
                match value {
                    Value::Array(extra) => base.extend(extra),
                    other => base.push(other),
                }
            }
            continue;
        }
        bool_query.insert(key, value);
    }
}

fn composite_sources() -> Value {
    json!([
        { "monitor_id": { "terms": { "field": fields::MONITOR_ID } } },
        { "status": { "terms": { "field": fields::MONITOR_STATUS } } },
        {
            "location": {
                "terms": { "field": fields::OBSERVER_LOCATION, "missing_bucket": true }
            }
        },
    ])
}

/// Status query prepared once per fetch, rendered once per page
#[derive(Debug, Clone)]
pub struct StatusQuery {
    index: String,
    bool_query: Map<String, Value>,
}

impl StatusQuery {
    /// Validate the parameters and assemble the fixed part of the query
    pub fn prepare(params: &GetMonitorStatusParams) -> Result<Self, MonitorStatusError> {
        let fragment = params.raw_filters().map(parse_filters).transpose()?;

        let filter: Vec<Value> = build_filter_clauses(params, fragment.is_some())
            .iter()
            .map(FilterClause::to_query)
            .collect();

        let mut bool_query = Map::new();
        bool_query.insert("filter".to_string(), Value::Array(filter));
        if let Some(fragment) = fragment {
            merge_fragment(&mut bool_query, fragment);
        }

        Ok(Self {
            index: params.dynamic_settings.heartbeat_indices.clone(),
            bool_query,
        })
    }

    /// Render the request for one page, resuming after `after_key` if given
    pub fn request(&self, after_key: Option<&AfterKey>) -> SearchRequest {
        let mut composite = json!({
            "size": COMPOSITE_PAGE_SIZE,
            "sources": composite_sources(),
        });
        if let Some(after_key) = after_key {
            composite["after"] = after_key.to_value();
        }

        SearchRequest {
            index: self.index.clone(),
            body: json!({
                "size": 0,
                "query": { "bool": self.bool_query },
                "aggs": { "monitors": { "composite": composite } },
            }),
        }
    }
}

/// Build a single page request from scratch
pub fn build_status_request(
    params: &GetMonitorStatusParams,
    after_key: Option<&AfterKey>,
) -> Result<SearchRequest, MonitorStatusError> {
    Ok(StatusQuery::prepare(params)?.request(after_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::monitor_status::types::TimeRange;

    fn params(from: &str, to: &str) -> GetMonitorStatusParams {
        GetMonitorStatusParams {
            num_times: 5,
            ..GetMonitorStatusParams::new(TimeRange::new(from, to))
        }
    }

    fn expected_aggs() -> Value {
        json!({
            "monitors": {
                "composite": {
                    "size": 2000,
                    "sources": [
                        { "monitor_id": { "terms": { "field": "monitor.id" } } },
                        { "status": { "terms": { "field": "monitor.status" } } },
                        {
                            "location": {
                                "terms": { "field": "observer.geo.name", "missing_bucket": true }
                            }
                        }
                    ]
                }
            }
        })
    }

    const MONITOR_ID_FILTERS: &str = r#"{
      "bool": {
        "should": [
          {
            "bool": {
              "should": [ { "match_phrase": { "monitor.id": "apm-dev" } } ],
              "minimum_should_match": 1
            }
          },
          {
            "bool": {
              "should": [ { "match_phrase": { "monitor.id": "auto-http-0X8D6082B94BBE3B8A" } } ],
              "minimum_should_match": 1
            }
          }
        ],
        "minimum_should_match": 1
      }
    }"#;

    #[test]
    fn test_base_request_without_extra_filters() {
        let request = build_status_request(&params("now-12m", "now-2m"), None).unwrap();

        assert_eq!(request.index, "heartbeat-8*");
        assert_eq!(
            request.body,
            json!({
                "size": 0,
                "query": {
                    "bool": {
                        "filter": [
                            { "term": { "monitor.status": "down" } },
                            { "range": { "@timestamp": { "gte": "now-12m", "lte": "now-2m" } } }
                        ]
                    }
                },
                "aggs": expected_aggs()
            })
        );
    }

    #[test]
    fn test_locations_become_or_clause() {
        let mut params = params("now-2m", "now");
        params.locations = vec!["fairbanks".to_string(), "harrisburg".to_string()];

        let request = build_status_request(&params, None).unwrap();

        assert_eq!(
            request.body["query"],
            json!({
                "bool": {
                    "filter": [
                        { "term": { "monitor.status": "down" } },
                        { "range": { "@timestamp": { "gte": "now-2m", "lte": "now" } } },
                        {
                            "bool": {
                                "should": [
                                    { "term": { "observer.geo.name": "fairbanks" } },
                                    { "term": { "observer.geo.name": "harrisburg" } }
                                ]
                            }
                        }
                    ]
                }
            })
        );
        assert!(request.body["query"]["bool"]["filter"][2]["bool"]
            .get("minimum_should_match")
            .is_none());
    }

    #[test]
    fn test_filters_merge_into_top_level_bool() {
        let mut params = params("now-10m", "now-1m");
        params.filters = Some(MONITOR_ID_FILTERS.to_string());

        let request = build_status_request(&params, None).unwrap();

        assert_eq!(
            request.body["query"],
            json!({
                "bool": {
                    "filter": [
                        { "term": { "monitor.status": "down" } },
                        { "range": { "@timestamp": { "gte": "now-10m", "lte": "now-1m" } } }
                    ],
                    "minimum_should_match": 1,
                    "should": [
                        {
                            "bool": {
                                "minimum_should_match": 1,
                                "should": [ { "match_phrase": { "monitor.id": "apm-dev" } } ]
                            }
                        },
                        {
                            "bool": {
                                "minimum_should_match": 1,
                                "should": [
                                    { "match_phrase": { "monitor.id": "auto-http-0X8D6082B94BBE3B8A" } }
                                ]
                            }
                        }
                    ]
                }
            })
        );
        assert_eq!(request.body["aggs"], expected_aggs());
    }

    #[test]
    fn test_filters_take_precedence_over_locations() {
        let mut params = params("now-10m", "now");
        params.filters = Some(MONITOR_ID_FILTERS.to_string());
        params.locations = vec!["fairbanks".to_string()];

        let request = build_status_request(&params, None).unwrap();
        let filter = request.body["query"]["bool"]["filter"].as_array().unwrap();

        assert_eq!(filter.len(), 2);
        assert!(!request.body.to_string().contains("fairbanks"));
    }

    #[test]
    fn test_blank_filters_fall_back_to_locations() {
        let mut params = params("now-10m", "now");
        params.filters = Some(String::new());
        params.locations = vec!["fairbanks".to_string()];

        let request = build_status_request(&params, None).unwrap();
        let filter = request.body["query"]["bool"]["filter"].as_array().unwrap();

        assert_eq!(filter.len(), 3);
        assert!(request.body["query"]["bool"].get("should").is_none());
    }

    #[test]
    fn test_fragment_filter_is_appended_not_replaced() {
        let mut params = params("now-10m", "now");
        params.filters =
            Some(r#"{"bool":{"filter":[{"term":{"monitor.type":"http"}}]}}"#.to_string());

        let request = build_status_request(&params, None).unwrap();

        assert_eq!(
            request.body["query"]["bool"]["filter"],
            json!([
                { "term": { "monitor.status": "down" } },
                { "range": { "@timestamp": { "gte": "now-10m", "lte": "now" } } },
                { "term": { "monitor.type": "http" } }
            ])
        );
    }

    #[test]
    fn test_invalid_filters_rejected() {
        let mut params = params("now-10m", "now");

        params.filters = Some("{ not json".to_string());
        assert!(matches!(
            build_status_request(&params, None),
            Err(MonitorStatusError::InvalidFilters(_))
        ));

        params.filters = Some(r#"{"match_all":{}}"#.to_string());
        assert!(matches!(
            build_status_request(&params, None),
            Err(MonitorStatusError::InvalidFilters(_))
        ));

        params.filters = Some("[1, 2]".to_string());
        assert!(matches!(
            build_status_request(&params, None),
            Err(MonitorStatusError::InvalidFilters(_))
        ));
    }

    #[test]
    fn test_cursor_attached_verbatim() {
        let after_key: AfterKey = serde_json::from_value(json!({
            "monitor_id": "foo",
            "location": "harrisburg",
            "status": "down"
        }))
        .unwrap();

        let query = StatusQuery::prepare(&params("now-10m", "now")).unwrap();
        let first = query.request(None);
        let next = query.request(Some(&after_key));

        assert!(first.body["aggs"]["monitors"]["composite"].get("after").is_none());
        assert_eq!(
            next.body["aggs"]["monitors"]["composite"]["after"],
            json!({ "monitor_id": "foo", "location": "harrisburg", "status": "down" })
        );
        assert_eq!(first.body["query"], next.body["query"]);
    }

    #[test]
    fn test_num_times_does_not_change_request() {
        let mut low = params("now-10m", "now");
        low.num_times = 1;
        let mut high = low.clone();
        high.num_times = 50;

        assert_eq!(
            build_status_request(&low, None).unwrap(),
            build_status_request(&high, None).unwrap()
        );
    }

    #[test]
    fn test_index_from_dynamic_settings() {
        let mut params = params("now-10m", "now");
        params.dynamic_settings.heartbeat_indices = "heartbeat-7*".to_string();

        let request = build_status_request(&params, None).unwrap();
        assert_eq!(request.index, "heartbeat-7*");
    }

    #[test]
    fn test_filter_clause_rendering() {
        let values = vec!["a".to_string()];
        assert_eq!(
            FilterClause::AnyOf {
                field: fields::OBSERVER_LOCATION,
                values: &values,
            }
            .to_query(),
            json!({ "bool": { "should": [ { "term": { "observer.geo.name": "a" } } ] } })
        );
        assert_eq!(
            FilterClause::Term {
                field: fields::MONITOR_STATUS,
                value: "down",
            }
            .to_query(),
            json!({ "term": { "monitor.status": "down" } })
        );
    }
}
