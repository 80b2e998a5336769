use std::future::Future;

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::TrackerConfig;
use crate::error::FetchError;
use crate::http_client::build_http_client;

/// Rows of cell strings as returned by the backend. Rows may be ragged.
pub type RawCellGrid = Vec<Vec<String>>;

/// Anything that can answer a range read against a named tab.
pub trait RangeSource: Send + Sync {
    fn fetch_range(
        &self,
        tab: &str,
        range: &str,
    ) -> impl Future<Output = Result<RawCellGrid, FetchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

pub struct SheetClient {
    config: TrackerConfig,
    client: Client,
}

impl SheetClient {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let client = build_http_client(config.request_timeout)?;
        Ok(Self { config, client })
    }

    pub fn range_url(&self, tab: &str, range: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}!{}?key={}",
            self.config.api_base,
            self.config.spreadsheet_id,
            escape_tab_name(tab),
            range,
            self.config.api_key
        )
    }

    async fn get_body(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                detail: format!("{status}: {}", body.trim()),
            });
        }
        Ok(body)
    }
}

impl RangeSource for SheetClient {
    async fn fetch_range(&self, tab: &str, range: &str) -> Result<RawCellGrid, FetchError> {
        let url = self.range_url(tab, range);
        debug!("sheet request {}", redact_key(&url));
        let body = self.get_body(&url).await?;
        let grid = parse_values_json(&body)?;
        debug!(tab, range, rows = grid.len(), "sheet response");
        Ok(grid)
    }
}

/// Tab names go into a path segment, so `/` must be escaped.
pub fn escape_tab_name(tab: &str) -> String {
    tab.replace('/', "%2f")
}

/// Decodes a values response. A missing `values` key is an empty range.
pub fn parse_values_json(raw: &str) -> Result<RawCellGrid, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let parsed: ValueRange =
        serde_json::from_str(trimmed).map_err(|err| FetchError::Decode(err.to_string()))?;
    let grid = parsed
        .values
        .unwrap_or_default()
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect();
    Ok(grid)
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn redact_key(url: &str) -> String {
    match url.find("key=") {
        Some(idx) => format!("{}key=<redacted>", &url[..idx]),
        None => url.to_string(),
    }
}
