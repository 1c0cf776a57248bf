//! PostgREST-backed [`RecordStore`].
//!
//! Talks to the managed backend's REST surface (`/rest/v1/{table}`) with the
//! service key in both the `apikey` and bearer headers, and pages through a
//! range with `limit`/`offset` in primary-key order. The backend may cap a page
//! below the requested `limit`, so paging stops on the exact row count it
//! reports in `Content-Range`, or on an empty page when no count comes back.

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::Client;
use sci_core::error::{DashboardError, Result};
use sci_core::settings::RestConfig;
use serde_json::Value;
use tracing::debug;

use crate::store::{RangeQuery, RecordStore, StoreError, StoreResult};

/// Longest backend error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 300;

/// Stable paging order; every table is keyed by `id`.
const PAGE_ORDER: &str = "id.asc";

/// One page of rows plus the total the backend reported for the whole range.
struct Page {
    rows: Vec<Value>,
    total: Option<usize>,
}

pub struct PostgrestStore {
    client: Client,
    config: RestConfig,
}

impl PostgrestStore {
    pub fn new(config: RestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DashboardError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    async fn fetch_page(
        &self,
        query: &RangeQuery,
        offset: usize,
    ) -> StoreResult<Page> {
        let params = query_params(query, self.config.page_size, offset);
        let response = self
            .client
            .get(self.endpoint(&query.table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json")
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await
            .map_err(|source| StoreError::Request {
                table: query.table.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                table: query.table.clone(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(range_total);

        let payload: Value = response.json().await.map_err(|source| StoreError::Request {
            table: query.table.clone(),
            source,
        })?;

        match payload {
            Value::Array(rows) => Ok(Page { rows, total }),
            other => Err(StoreError::Payload {
                table: query.table.clone(),
                message: format!("expected an array of rows, got {}", json_kind(&other)),
            }),
        }
    }
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn select(&self, query: &RangeQuery) -> StoreResult<Vec<Value>> {
        let mut rows = Vec::new();

        loop {
            let page = self.fetch_page(query, rows.len()).await?;
            if page.rows.is_empty() {
                break;
            }
            rows.extend(page.rows);
            if page.total.is_some_and(|total| rows.len() >= total) {
                break;
            }
        }

        debug!(table = %query.table, rows = rows.len(), "backend range read complete");
        Ok(rows)
    }
}

/// Query-string parameters for one page of `query`.
pub fn query_params(query: &RangeQuery, limit: u32, offset: usize) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), query.select.clone()),
        (
            query.date_column.clone(),
            format!("gte.{}", query.since.format("%Y-%m-%d")),
        ),
    ];
    params.extend(
        query
            .equals
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{}", value))),
    );
    params.push(("order".to_string(), PAGE_ORDER.to_string()));
    params.push(("limit".to_string(), limit.to_string()));
    params.push(("offset".to_string(), offset.to_string()));
    params
}

/// Total row count from a `Content-Range` value such as `0-999/2500` or `*/0`.
///
/// `None` when the backend did not count (`0-999/*`) or the header is garbled.
fn range_total(content_range: &str) -> Option<usize> {
    let (_, total) = content_range.split_once('/')?;
    total.trim().parse().ok()
}

/// The backend's `message` field when the body is a PostgREST error object,
/// otherwise the (truncated) raw body.
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = map.get("message") {
            return message.clone();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Scope;
    use chrono::NaiveDate;
    use sci_core::models::RecordSource;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn config() -> RestConfig {
        RestConfig {
            url: "https://abc.supabase.co".to_string(),
            api_key: "secret".to_string(),
            timeout: Duration::from_secs(5),
            page_size: 500,
        }
    }

    // ── query_params ──────────────────────────────────────────────────────────

    #[test]
    fn test_query_params_plain_source() {
        let scope = Scope::new(Some("s1".to_string()), None);
        let q = RangeQuery::for_source(RecordSource::Swaps, since(), &scope);
        let params = query_params(&q, 1000, 0);
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("data_referencia".to_string(), "gte.2024-04-01".to_string()),
                ("secao_id".to_string(), "eq.s1".to_string()),
                ("order".to_string(), "id.asc".to_string()),
                ("limit".to_string(), "1000".to_string()),
                ("offset".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_params_taf_results_go_through_parent() {
        let scope = Scope::new(Some("s1".to_string()), Some("e2".to_string()));
        let q = RangeQuery::for_source(RecordSource::TafResults, since(), &scope);
        let params = query_params(&q, 100, 200);
        assert_eq!(params[0].1, "*,taf_registros!inner(data_teste,secao_id,equipe_id)");
        assert_eq!(params[1], ("taf_registros.data_teste".to_string(), "gte.2024-04-01".to_string()));
        assert_eq!(params[2], ("taf_registros.secao_id".to_string(), "eq.s1".to_string()));
        assert_eq!(params[3], ("taf_registros.equipe_id".to_string(), "eq.e2".to_string()));
        assert_eq!(params[6], ("offset".to_string(), "200".to_string()));
    }

    // ── range_total ───────────────────────────────────────────────────────────

    #[test]
    fn test_range_total() {
        assert_eq!(range_total("0-999/2500"), Some(2500));
        assert_eq!(range_total("*/0"), Some(0));
        assert_eq!(range_total("0-999/*"), None);
        assert_eq!(range_total("garbled"), None);
    }

    // ── error_message ─────────────────────────────────────────────────────────

    #[test]
    fn test_error_message_prefers_backend_message() {
        let body = r#"{"code":"42P01","message":"relation \"tempo_epr\" does not exist"}"#;
        assert_eq!(error_message(body), "relation \"tempo_epr\" does not exist");
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_message(""), "empty response body");
        assert_eq!(error_message(&"x".repeat(1000)).len(), MAX_ERROR_BODY);
    }

    // ── PostgrestStore ────────────────────────────────────────────────────────

    #[test]
    fn test_endpoint() {
        let store = PostgrestStore::new(config()).unwrap();
        assert_eq!(
            store.endpoint("tempo_epr"),
            "https://abc.supabase.co/rest/v1/tempo_epr"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_error() {
        let mut cfg = config();
        cfg.url = "http://127.0.0.1:1".to_string();
        cfg.timeout = Duration::from_secs(2);
        let store = PostgrestStore::new(cfg).unwrap();
        let q = RangeQuery::for_source(RecordSource::Swaps, since(), &Scope::default());
        let err = store.select(&q).await.unwrap_err();
        assert!(matches!(err, StoreError::Request { .. }), "{err}");
        assert!(err.to_string().starts_with("request failed"), "{err}");
    }

    // ── PostgrestStore against a local backend ────────────────────────────────

    /// Status, optional `Content-Range` and body for one request target.
    type Reply = (u16, Option<String>, String);

    /// Minimal HTTP/1.1 backend on an ephemeral port. Answers each connection
    /// once and records the raw request text.
    async fn local_backend<F>(reply: F) -> (String, Arc<Mutex<Vec<String>>>)
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut raw = Vec::new();
                let mut chunk = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => raw.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&raw).to_string();
                let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                log.lock().unwrap().push(request);

                let (status, range, body) = reply(&target);
                let mut head = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                    status,
                    body.len()
                );
                if let Some(range) = range {
                    head.push_str(&format!("Content-Range: {}\r\n", range));
                }
                head.push_str("\r\n");
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), requests)
    }

    fn param(target: &str, name: &str) -> Option<usize> {
        let (_, query) = target.split_once('?')?;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
            .and_then(|value| value.parse().ok())
    }

    /// Serves `total` swap rows, never more than `cap` per response.
    fn capped_table(total: usize, cap: usize, count: bool) -> impl Fn(&str) -> Reply {
        move |target: &str| {
            let offset = param(target, "offset").unwrap_or(0).min(total);
            let limit = param(target, "limit").unwrap_or(usize::MAX);
            let end = (offset + limit.min(cap)).min(total);
            let rows: Vec<Value> = (offset..end)
                .map(|id| json!({"id": id, "data_referencia": "2024-04-02"}))
                .collect();
            let range = count.then(|| {
                if rows.is_empty() {
                    format!("*/{}", total)
                } else {
                    format!("{}-{}/{}", offset, end - 1, total)
                }
            });
            (200, range, Value::Array(rows).to_string())
        }
    }

    fn store_at(url: String, page_size: u32) -> PostgrestStore {
        let mut cfg = config();
        cfg.url = url;
        cfg.page_size = page_size;
        PostgrestStore::new(cfg).unwrap()
    }

    fn swaps_query() -> RangeQuery {
        RangeQuery::for_source(RecordSource::Swaps, since(), &Scope::default())
    }

    #[tokio::test]
    async fn test_select_pages_past_server_row_cap() {
        let (url, requests) = local_backend(capped_table(2500, 1000, true)).await;
        let rows = store_at(url, 5000).select(&swaps_query()).await.unwrap();

        assert_eq!(rows.len(), 2500);
        let ids: Vec<u64> = rows.iter().filter_map(|r| r["id"].as_u64()).collect();
        assert_eq!(ids, (0..2500).collect::<Vec<u64>>());

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.contains("order=id.asc")));
        assert!(requests
            .iter()
            .all(|r| r.to_ascii_lowercase().contains("prefer: count=exact")));
    }

    #[tokio::test]
    async fn test_select_accumulates_full_pages() {
        let (url, requests) = local_backend(capped_table(7, 1000, true)).await;
        let rows = store_at(url, 3).select(&swaps_query()).await.unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_select_without_count_reads_until_empty_page() {
        let (url, requests) = local_backend(capped_table(5, 2, false)).await;
        let rows = store_at(url, 1000).select(&swaps_query()).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_select_empty_table() {
        let (url, _) = local_backend(capped_table(0, 1000, true)).await;
        let rows = store_at(url, 1000).select(&swaps_query()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_select_error_status_carries_backend_message() {
        let (url, _) = local_backend(|_: &str| {
            (
                404,
                None,
                r#"{"code":"42P01","message":"relation \"controle_trocas\" does not exist"}"#
                    .to_string(),
            )
        })
        .await;
        let err = store_at(url, 1000).select(&swaps_query()).await.unwrap_err();
        match err {
            StoreError::Status { table, status, message } => {
                assert_eq!(table, "controle_trocas");
                assert_eq!(status, 404);
                assert_eq!(message, "relation \"controle_trocas\" does not exist");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_select_non_array_payload_is_error() {
        let (url, _) =
            local_backend(|_: &str| (200, None, r#"{"rows": []}"#.to_string())).await;
        let err = store_at(url, 1000).select(&swaps_query()).await.unwrap_err();
        assert!(matches!(err, StoreError::Payload { .. }), "{err}");
        assert!(err.to_string().contains("an object"), "{err}");
    }
}
