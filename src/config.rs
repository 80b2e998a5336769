use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_CONTENTFUL_API_BASE: &str = "https://cdn.contentful.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Credentials and endpoint for the points spreadsheet.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub spreadsheet_id: String,
    pub api_key: String,
    pub maintainer_contact: Option<String>,
    pub api_base: String,
    pub request_timeout: Duration,
}

impl TrackerConfig {
    pub fn new(spreadsheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
            maintainer_contact: None,
            api_base: DEFAULT_SHEETS_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. The request timeout is always 10 s.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let spreadsheet_id = var("SPREADSHEET_ID")
            .context("missing required environment variable SPREADSHEET_ID")?;
        let api_key = var("GOOGLE_CLOUD_API_KEY")
            .context("missing required environment variable GOOGLE_CLOUD_API_KEY")?;
        let api_base = var("SHEETS_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string());

        Ok(Self {
            spreadsheet_id,
            api_key,
            maintainer_contact: var("TROUBLESHOOT_CONTACT_ID"),
            api_base,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Public browser link to the spreadsheet.
    pub fn sheet_link(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", self.spreadsheet_id)
    }
}

#[derive(Debug, Clone)]
pub struct EventsConfig {
    pub space_id: String,
    pub access_token: String,
    pub content_type: String,
    pub api_base: String,
}

impl EventsConfig {
    /// Returns `None` when any Contentful credential is missing; the events
    /// command is then reported as unavailable instead of failing startup.
    pub fn from_env() -> Option<Self> {
        let space_id = optional_env("CONTENTFUL_SPACE_ID")?;
        let access_token = optional_env("CONTENTFUL_ACCESS_TOKEN")?;
        let content_type = optional_env("EVENT_CONTENT_TYPE_ID")?;
        let api_base = optional_env("CONTENTFUL_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_CONTENTFUL_API_BASE.to_string());
        Some(Self {
            space_id,
            access_token,
            content_type,
            api_base,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::TrackerConfig;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn sheet_link_uses_spreadsheet_id() {
        let cfg = TrackerConfig::new("abc123", "key");
        assert_eq!(cfg.sheet_link(), "https://docs.google.com/spreadsheets/d/abc123");
    }

    #[test]
    fn new_uses_ten_second_timeout() {
        let cfg = TrackerConfig::new("abc123", "key");
        assert_eq!(cfg.request_timeout.as_secs(), 10);
        assert!(cfg.maintainer_contact.is_none());
    }

    #[test]
    fn timeout_is_fixed_at_ten_seconds() {
        let cfg = TrackerConfig::from_lookup(lookup(&[
            ("SPREADSHEET_ID", "abc123"),
            ("GOOGLE_CLOUD_API_KEY", "key"),
            ("SHEETS_TIMEOUT_SECS", "3"),
            ("SHEETS_API_BASE", "http://127.0.0.1:9/v4/"),
            ("TROUBLESHOOT_CONTACT_ID", "  "),
        ]))
        .unwrap();
        assert_eq!(cfg.request_timeout.as_secs(), 10);
        assert_eq!(cfg.api_base, "http://127.0.0.1:9/v4");
        assert!(cfg.maintainer_contact.is_none());
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = TrackerConfig::from_lookup(lookup(&[("SPREADSHEET_ID", "abc123")])).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_CLOUD_API_KEY"));
    }
}
