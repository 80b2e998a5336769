use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EventsConfig;
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromoEvent {
    pub name: String,
    pub event_date: DateTime<Utc>,
    pub description: String,
}

/// Visible events split around "now", each half in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventListing {
    pub upcoming: Vec<PromoEvent>,
    pub recent: Vec<PromoEvent>,
}

impl EventListing {
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.recent.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct EntriesResponse {
    #[serde(default)]
    items: Vec<EntryItem>,
}

#[derive(Debug, Deserialize)]
struct EntryItem {
    fields: EventFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventFields {
    #[serde(default)]
    event_name: String,
    event_date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(default)]
    description: String,
}

pub struct EventsFeed {
    config: EventsConfig,
    client: Client,
}

impl EventsFeed {
    pub fn new(config: EventsConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/entries?content_type={}&order=fields.eventDate&access_token={}",
            self.config.api_base,
            self.config.space_id,
            self.config.content_type,
            self.config.access_token
        )
    }

    pub async fn fetch(&self, now: DateTime<Utc>) -> Result<EventListing, FetchError> {
        let resp = self.client.get(self.entries_url()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                detail: format!("{status}: {}", body.trim()),
            });
        }
        parse_entries_json(&body, now)
    }
}

pub fn parse_entries_json(raw: &str, now: DateTime<Utc>) -> Result<EventListing, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(EventListing::default());
    }
    let parsed: EntriesResponse =
        serde_json::from_str(trimmed).map_err(|err| FetchError::Decode(err.to_string()))?;

    let mut listing = EventListing::default();
    for item in parsed.items {
        let fields = item.fields;
        let dates = (
            fields.event_date.as_deref().and_then(parse_feed_date),
            fields.start_date.as_deref().and_then(parse_feed_date),
            fields.end_date.as_deref().and_then(parse_feed_date),
        );
        let (Some(event_date), Some(start), Some(end)) = dates else {
            warn!(event = %fields.event_name, "skipping event with missing or invalid dates");
            continue;
        };
        if start > now || end < now {
            continue;
        }
        let event = PromoEvent {
            name: fields.event_name,
            event_date,
            description: fields.description,
        };
        if event_date < now {
            listing.recent.push(event);
        } else {
            listing.upcoming.push(event);
        }
    }
    debug!(
        upcoming = listing.upcoming.len(),
        recent = listing.recent.len(),
        "events parsed"
    );
    Ok(listing)
}

/// Accepts RFC 3339, minute-precision offsets and bare dates (midnight UTC).
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::parse_feed_date;

    #[test]
    fn parses_supported_date_shapes() {
        let expected = Utc.with_ymd_and_hms(2022, 3, 5, 23, 0, 0).unwrap();
        assert_eq!(parse_feed_date("2022-03-05T23:00:00Z"), Some(expected));
        assert_eq!(parse_feed_date("2022-03-05T18:00-05:00"), Some(expected));
        assert_eq!(
            parse_feed_date("2022-03-05"),
            Some(Utc.with_ymd_and_hms(2022, 3, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_feed_date("next tuesday"), None);
    }
}
