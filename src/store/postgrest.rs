//! PostgREST (Supabase) upsert sink.
//!
//! An upsert is a `POST /rest/v1/<table>?on_conflict=<column>` carrying the
//! batch as a JSON array, with `Prefer: resolution=merge-duplicates` so the
//! store resolves key collisions by overwriting the existing row.

use super::SnapshotStore;
use crate::config::StoreCredentials;
use crate::error::{truncate_body, SnapshotError, SnapshotResult};
use crate::record::MarketRecord;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::time::Instant;
use tracing::debug;

const REST_PREFIX: [&str; 2] = ["rest", "v1"];
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: Client,
    base: Url,
    key: String,
}

impl PostgrestStore {
    pub fn new(client: Client, credentials: StoreCredentials) -> SnapshotResult<Self> {
        if credentials.url.cannot_be_a_base() {
            return Err(SnapshotError::Configuration(format!(
                "store URL '{}' cannot be used as a base URL",
                credentials.url
            )));
        }
        Ok(Self {
            client,
            base: credentials.url,
            key: credentials.key,
        })
    }

    /// `<base>/rest/v1/<table>?on_conflict=<conflict_key>`
    pub fn table_url(&self, table: &str, conflict_key: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(REST_PREFIX).push(table);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("on_conflict", conflict_key);
        url
    }

    fn request(&self, table: &str, conflict_key: &str, batch: &[MarketRecord]) -> RequestBuilder {
        self.client
            .post(self.table_url(table, conflict_key))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", UPSERT_PREFER)
            .json(batch)
    }
}

fn rejected(detail: String) -> SnapshotError {
    // Position is filled in by the upsert loop.
    SnapshotError::Persistence {
        batch: 0,
        of: 0,
        detail,
    }
}

// PostgREST errors are JSON: {"code","message","details","hint"}
fn status_error(status: StatusCode, body: &str) -> SnapshotError {
    rejected(format!("HTTP {} - {}", status, truncate_body(body)))
}

#[async_trait]
impl SnapshotStore for PostgrestStore {
    async fn upsert(
        &self,
        table: &str,
        conflict_key: &str,
        batch: &[MarketRecord],
    ) -> SnapshotResult<()> {
        let start = Instant::now();

        let resp = self
            .request(table, conflict_key, batch)
            .send()
            .await
            .map_err(|e| rejected(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        debug!(
            "PostgREST: upserted {} rows into {} ({} ms)",
            batch.len(),
            table,
            start.elapsed().as_millis()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn store(url: &str) -> PostgrestStore {
        PostgrestStore::new(
            Client::new(),
            StoreCredentials {
                url: Url::parse(url).unwrap(),
                key: "service-key".into(),
            },
        )
        .unwrap()
    }

    fn records() -> Vec<MarketRecord> {
        vec![
            MarketRecord::try_from(json!({"id": "bitcoin", "current_price": 67000.5})).unwrap(),
            MarketRecord::try_from(json!({"id": "ethereum", "current_price": 3500.1})).unwrap(),
        ]
    }

    #[test]
    fn test_table_url() {
        let url = store("https://example.supabase.co").table_url("snapshot", "id");
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/snapshot?on_conflict=id"
        );
    }

    #[test]
    fn test_table_url_keeps_base_path() {
        let url = store("http://localhost:54321/proxy/").table_url("coins", "coin_id");
        assert_eq!(
            url.as_str(),
            "http://localhost:54321/proxy/rest/v1/coins?on_conflict=coin_id"
        );
    }

    #[test]
    fn test_upsert_request_shape() {
        let batch = records();
        let req = store("https://example.supabase.co")
            .request("snapshot", "id", &batch)
            .build()
            .unwrap();

        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.headers()["apikey"], "service-key");
        assert_eq!(req.headers()["authorization"], "Bearer service-key");
        assert_eq!(req.headers()["prefer"], UPSERT_PREFER);
        assert_eq!(req.headers()["content-type"], "application/json");

        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(
            sent,
            json!([
                {"id": "bitcoin", "current_price": 67000.5},
                {"id": "ethereum", "current_price": 3500.1}
            ])
        );
    }

    #[test]
    fn test_status_error_bounds_body() {
        let body = format!(r#"{{"code":"PGRST204","message":"{}"}}"#, "y".repeat(4096));
        let err = status_error(StatusCode::BAD_REQUEST, &body);
        let msg = err.to_string();
        assert!(msg.contains("400 Bad Request"), "{msg}");
        assert!(msg.contains("PGRST204"), "{msg}");
        assert!(msg.len() < 700, "{}", msg.len());
    }

    #[test]
    fn test_rejects_non_base_url() {
        let err = PostgrestStore::new(
            Client::new(),
            StoreCredentials {
                url: Url::parse("mailto:ops@example.com").unwrap(),
                key: "k".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, SnapshotError::Configuration(_)));
    }
}
