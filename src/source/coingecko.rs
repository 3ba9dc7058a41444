//! CoinGecko `/coins/markets` page fetcher.

use super::MarketSource;
use crate::error::{truncate_body, SnapshotError, SnapshotResult};
use crate::record::{MarketRecord, Page};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

const DEMO_KEY_HEADER: &str = "x-cg-demo-api-key";
const PRO_KEY_HEADER: &str = "x-cg-pro-api-key";

/// CoinGecko-backed market source, ordered by market cap descending.
#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    client: Client,
    base: Url,
    vs_currency: String,
    api_key: Option<String>,
}

impl CoinGeckoSource {
    pub fn new(client: Client, base: Url, vs_currency: impl Into<String>) -> Self {
        Self {
            client,
            base,
            vs_currency: vs_currency.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// URL for one page.
    pub fn page_url(&self, page: u32, per_page: usize) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("vs_currency", &self.vs_currency)
            .append_pair("order", "market_cap_desc")
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string());
        url
    }

    /// Pro keys only work against the pro host and vice versa.
    fn key_header(&self) -> &'static str {
        match self.base.host_str() {
            Some(host) if host.starts_with("pro-api.") => PRO_KEY_HEADER,
            _ => DEMO_KEY_HEADER,
        }
    }

    fn request(&self, page: u32, per_page: usize) -> RequestBuilder {
        let req = self
            .client
            .get(self.page_url(page, per_page))
            .header("accept", "application/json");
        match &self.api_key {
            Some(key) => req.header(self.key_header(), key),
            None => req,
        }
    }
}

/// Decode a page body: a JSON array whose items are all objects.
pub(crate) fn decode_page(page: u32, body: &[u8]) -> SnapshotResult<Page> {
    let malformed = |detail: String| SnapshotError::MalformedPage { page, detail };

    let value: Value = serde_json::from_slice(body).map_err(|e| malformed(e.to_string()))?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(malformed(format!(
                "expected a JSON array, got {}",
                kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            MarketRecord::try_from(item)
                .map_err(|other| malformed(format!("item {i} is {}, not an object", kind(&other))))
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl MarketSource for CoinGeckoSource {
    async fn fetch_page(&self, page: u32, per_page: usize) -> SnapshotResult<Page> {
        let start = Instant::now();
        let unavailable = |detail: String| SnapshotError::SourceUnavailable { page, detail };

        let resp = self
            .request(page, per_page)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(unavailable(format!(
                "HTTP {} - {}",
                status,
                truncate_body(&body)
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| unavailable(format!("failed to read body: {e}")))?;

        let records = decode_page(page, &body)?;
        debug!(
            "CoinGecko: page {} -> {} records ({} bytes, {} ms)",
            page,
            records.len(),
            body.len(),
            start.elapsed().as_millis()
        );
        Ok(records)
    }
}
