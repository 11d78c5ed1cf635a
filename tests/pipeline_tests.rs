//! Integration tests for the scrape, verify and reconcile pipeline
//!
//! These tests run the coordinator against a mock ticketing site.

use chrono::NaiveDate;
use fringe_sift::config::{
    Config, CrawlerConfig, InputConfig, OutputConfig, SiteConfig, UserAgentConfig,
    VerificationConfig,
};
use fringe_sift::crawler::{Coordinator, Phase};
use fringe_sift::storage::MemoryStorage;
use fringe_sift::FringeError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create a test configuration
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let out = |name: &str| dir.join(name).to_string_lossy().into_owned();

    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            listing_path: "/events".to_string(),
        },
        crawler: CrawlerConfig {
            retry_delay_ms: 1,
            ..CrawlerConfig::default()
        },
        verification: VerificationConfig {
            start_date: NaiveDate::from_ymd_opt(2026, 2, 13).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            request_delay_ms: 0,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        },
        input: InputConfig::default(),
        output: OutputConfig {
            events_path: out("fringe_all_events.json"),
            verified_path: out("verified_schedule.json"),
            canonical_path: out("fringe_events.json"),
            palette_path: Some(out("venue_palette.json")),
        },
    }
}

fn listing_page(links: &[&str]) -> String {
    let buttons: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<div class="card"><a class="btn btn-success secondary-border-color" href="{}">Book</a></div>"#,
                href
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", buttons)
}

fn event_page(title: &str, venue: &str, time: &str, schedule: &str) -> String {
    format!(
        r#"<html><body><div class="container py-5">
            <h2 class="primary-color">{title}</h2>
            <p>A show about {title}, performed nightly for anyone who wanders in off the street.</p>
            <h4>Venue</h4>
            <p>{venue}<br>Cuba Street</p>
            <ul class="schedule">
                <li><img src="/img/calendar.svg"> {schedule}</li>
            </ul>
            <script>window.show = {{"performanceTime":"{time}"}};</script>
        </div></body></html>"#
    )
}

fn day_listing(cards: &[(&str, &str)]) -> String {
    let cards: String = cards
        .iter()
        .map(|(title, venue)| {
            format!(
                r#"<div class="card">
                    <h4 class="primary-color two-line-clamp">{}</h4>
                    <p class="dt-loc event-location"><span class="one-line-clamp">{}</span></p>
                </div>"#,
                title, venue
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_day(server: &MockServer, day: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(query_param("start_date", day))
        .respond_with(template)
        .mount(server)
        .await;
}

fn read_json(path: &str) -> serde_json::Value {
    let raw = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_full_pipeline_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let uri = server.uri();

    // Day listings are mounted before the plain listing so they match first
    mount_day(
        &server,
        "13/02/2026",
        ResponseTemplate::new(200).set_body_string(day_listing(&[("Show A", "Fringe Bar")])),
    )
    .await;
    mount_day(&server, "14/02/2026", ResponseTemplate::new(500)).await;

    mount_page(
        &server,
        "/events",
        listing_page(&["/event/1/", "/event/2/", "/event/3/", "/event/4/", "/event/1/"]),
    )
    .await;

    let schedule = "13-14 February 2026";
    mount_page(&server, "/event/1/", event_page("Show A", "The Fringe Bar", "7:00 pm", schedule)).await;
    mount_page(&server, "/event/2/", event_page("Show A", "The Fringe Bar", "7:00 pm", schedule)).await;
    mount_page(&server, "/event/3/", event_page("Show A", "The Fringe Bar", "9:00 pm", schedule)).await;
    Mock::given(method("GET"))
        .and(path("/event/4/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let priority_path = dir.path().join("priority.txt");
    std::fs::write(&priority_path, format!("\"{}/event/3/\",\n", uri)).unwrap();

    let mut config = create_test_config(&uri, dir.path());
    config.input.priority_path = Some(priority_path.to_string_lossy().into_owned());
    let output = config.output.clone();

    let mut coordinator = Coordinator::new(config).unwrap();
    coordinator.run(Phase::All).await.unwrap();

    let stats = coordinator.stats();
    assert_eq!(stats.discovered, 4);
    assert_eq!(stats.queued, 4);
    assert_eq!(stats.scraped, 3);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.days_crawled, 1);
    assert_eq!(stats.days_failed, 1);
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.verified, 2);
    assert_eq!(stats.fallback, 0);

    let raw = read_json(&output.events_path);
    assert_eq!(raw.as_array().unwrap().len(), 3);
    assert_eq!(raw[0]["link"], format!("{}/event/3/", uri));
    assert_eq!(raw[0]["schedule"], "13 February 2026, 14 February 2026");

    let verified = read_json(&output.verified_path);
    assert_eq!(verified["Show A"]["Fringe Bar"][0], "13/02/2026");

    let canonical = read_json(&output.canonical_path);
    let canonical = canonical.as_array().unwrap();
    assert_eq!(canonical.len(), 2);
    assert_eq!(canonical[0]["time"], "9:00 pm");
    assert_eq!(canonical[1]["time"], "7:00 pm");
    for record in canonical {
        assert_eq!(record["loc"], "The Fringe Bar");
        assert_eq!(record["verification"], "verified");
        assert_eq!(record["dateList"], serde_json::json!(["13 February 2026"]));
    }

    let palette = read_json(output.palette_path.as_deref().unwrap());
    assert_eq!(palette["The Fringe Bar"], "hsl(0, 80%, 52%)");
}

#[tokio::test]
async fn test_discovery_without_event_links_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, "/events", "<html><body>Maintenance</body></html>".to_string()).await;

    let config = create_test_config(&server.uri(), dir.path());
    let events_path = config.output.events_path.clone();
    let mut coordinator = Coordinator::new(config).unwrap();

    let result = coordinator.run(Phase::All).await;
    assert!(matches!(result, Err(FringeError::Discovery { .. })));
    assert!(!Path::new(&events_path).exists());
}

#[tokio::test]
async fn test_checkpoints_every_interval() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/events",
        listing_page(&["/event/1/", "/event/2/", "/event/3/"]),
    )
    .await;
    for (i, route) in ["/event/1/", "/event/2/", "/event/3/"].iter().enumerate() {
        let title = format!("Show {}", i);
        mount_page(&server, route, event_page(&title, "BATS", "7:00 pm", "1 March 2026")).await;
    }

    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.checkpoint_interval = 2;

    let mut coordinator = Coordinator::with_storage(config, MemoryStorage::new()).unwrap();
    let records = coordinator.scrape_events().await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(coordinator.storage().raw_save_sizes, vec![2, 3]);
}

#[tokio::test]
async fn test_robots_disallowed_event_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/robots.txt",
        "User-agent: *\nDisallow: /event/2/\n".to_string(),
    )
    .await;
    mount_page(&server, "/events", listing_page(&["/event/1/", "/event/2/"])).await;
    mount_page(&server, "/event/1/", event_page("Show A", "BATS", "7:00 pm", "1 March 2026")).await;
    Mock::given(method("GET"))
        .and(path("/event/2/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let mut coordinator = Coordinator::with_storage(config, MemoryStorage::new()).unwrap();
    coordinator.scrape_events().await.unwrap();

    assert_eq!(coordinator.stats().scraped, 1);
    assert_eq!(coordinator.stats().failed, 1);
}

#[tokio::test]
async fn test_robots_disallowed_listing_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, "/robots.txt", "User-agent: *\nDisallow: /\n".to_string()).await;

    let config = create_test_config(&server.uri(), dir.path());
    let mut coordinator = Coordinator::with_storage(config, MemoryStorage::new()).unwrap();

    let result = coordinator.scrape_events().await;
    assert!(matches!(result, Err(FringeError::Discovery { .. })));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/events", listing_page(&["/event/1/"])).await;
    Mock::given(method("GET"))
        .and(path("/event/1/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/event/1/", event_page("Show A", "BATS", "7:00 pm", "1 March 2026")).await;

    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.max_retries = 1;

    let mut coordinator = Coordinator::with_storage(config, MemoryStorage::new()).unwrap();
    let records = coordinator.scrape_events().await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title.as_deref(), Some("Show A"));
    assert_eq!(coordinator.stats().failed, 0);
}

#[tokio::test]
async fn test_verify_phase_counts_irregular_pairs() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let irregular = format!(
        r#"<h4 class="primary-color two-line-clamp">No Venue Show</h4>{}"#,
        day_listing(&[("Show A", "BATS")])
    );
    mount_day(&server, "13/02/2026", ResponseTemplate::new(200).set_body_string(irregular)).await;
    mount_day(
        &server,
        "14/02/2026",
        ResponseTemplate::new(200)
            .set_body_string(day_listing(&[("Show A", "BATS"), ("Show A", "Te Auaha")])),
    )
    .await;

    let config = create_test_config(&server.uri(), dir.path());
    let mut coordinator = Coordinator::with_storage(config, MemoryStorage::new()).unwrap();
    coordinator.run(Phase::Verify).await.unwrap();

    assert_eq!(coordinator.stats().days_crawled, 2);
    assert_eq!(coordinator.stats().irregular_pairs, 1);

    let index = coordinator.storage().verified_index.clone().unwrap();
    let venues = index.venues_for("Show A").unwrap();
    assert_eq!(venues["BATS"], vec!["13/02/2026", "14/02/2026"]);
    assert_eq!(venues["Te Auaha"], vec!["14/02/2026"]);
    assert!(index.venues_for("No Venue Show").is_none());
}
