use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use points_tracker::commands::CommandOutcome;
use points_tracker::config::EventsConfig;
use points_tracker::error::FailureCategory;
use points_tracker::events::{EventsFeed, parse_entries_json};
use points_tracker::http_client::http_client;
use points_tracker::render::render;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn mid_january() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 15, 12, 0, 0).unwrap()
}

fn feed_config(base: &str) -> EventsConfig {
    EventsConfig {
        space_id: "space1".into(),
        access_token: "tok".into(),
        content_type: "event".into(),
        api_base: base.to_string(),
    }
}

#[test]
fn partitions_visible_events_around_now() {
    let listing = parse_entries_json(&read_fixture("contentful_entries.json"), mid_january())
        .expect("fixture should parse");
    let upcoming: Vec<&str> = listing.upcoming.iter().map(|e| e.name.as_str()).collect();
    let recent: Vec<&str> = listing.recent.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(upcoming, vec!["Packing Night"]);
    assert_eq!(recent, vec!["Winter Drive"]);
    assert_eq!(
        listing.recent[0].event_date,
        Utc.with_ymd_and_hms(2022, 1, 10, 23, 0, 0).unwrap()
    );
}

#[test]
fn null_feed_is_empty() {
    let listing = parse_entries_json("null", mid_january()).expect("null should parse");
    assert!(listing.is_empty());
}

#[test]
fn rendered_listing_has_both_sections() {
    let listing = parse_entries_json(&read_fixture("contentful_entries.json"), mid_january())
        .expect("fixture should parse");
    let text = render(&CommandOutcome::Events(listing), "@u1").expect("reply");
    let upcoming_at = text.find("__UPCOMING EVENTS__").expect("upcoming section");
    let recent_at = text.find("__RECENT AND ONGOING EVENTS__").expect("recent section");
    assert!(upcoming_at < recent_at);
    assert!(text.contains("Packing Night (Jan 20, 2022)"));
}

#[test]
fn entries_url_orders_by_event_date() {
    let feed = EventsFeed::new(
        feed_config("https://cdn.contentful.com"),
        http_client().expect("client").clone(),
    );
    assert_eq!(
        feed.entries_url(),
        "https://cdn.contentful.com/spaces/space1/entries?content_type=event&order=fields.eventDate&access_token=tok"
    );
}

#[tokio::test]
async fn feed_status_error_is_http_category() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut chunk = [0u8; 2048];
        let _ = socket.read(&mut chunk).await;
        let body = r#"{"sys":{"id":"AccessTokenInvalid"}}"#;
        let response = format!(
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    let feed = EventsFeed::new(
        feed_config(&format!("http://{addr}")),
        http_client().expect("client").clone(),
    );
    let err = feed.fetch(mid_january()).await.unwrap_err();
    assert_eq!(err.category(), FailureCategory::Http);
}
