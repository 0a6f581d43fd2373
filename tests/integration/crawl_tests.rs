//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! robots check, fetch, extraction and breadth-first loop end-to-end.

use larder::config::{parse_config, RobotsFailurePolicy, UserAgentConfig};
use larder::crawler::{build_http_client, crawl, Crawler, PageFetcher};
use larder::policy::{GenericPolicy, LinkPolicy, SitePolicy};
use larder::robots::RobotsGate;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0".to_string(),
        comment: "Testing".to_string(),
    }
}

/// Builds a crawler with a short delay for testing
fn test_crawler(policy: Box<dyn LinkPolicy>, on_failure: RobotsFailurePolicy) -> Crawler {
    let client = build_http_client(&test_user_agent()).expect("Failed to build client");
    let robots = RobotsGate::new(client.clone(), Duration::from_secs(5), on_failure);
    let fetcher = PageFetcher::new(client, robots, policy, Duration::from_secs(5), 5000);
    Crawler::new(fetcher, Duration::from_millis(10))
}

fn generic_crawler() -> Crawler {
    test_crawler(Box::new(GenericPolicy), RobotsFailurePolicy::Allow)
}

fn html_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>About {}</p>{}</body></html>",
        title, title, anchors
    )
}

async fn mount_robots(server: &MockServer, status: u16, body: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 200, "User-agent: *\nAllow: /", 1).await;
    mount_page(&server, "/", html_page("Home", &["/a", "/b"]), 1).await;
    mount_page(&server, "/a", html_page("A", &["/c", "/", "/a#top"]), 1).await;
    mount_page(&server, "/b", html_page("B", &["/a"]), 1).await;
    mount_page(&server, "/c", html_page("C", &[]), 1).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    let keys: Vec<String> = report.pages.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            format!("{}/", base),
            format!("{}/a", base),
            format!("{}/b", base),
            format!("{}/c", base),
        ]
    );
    assert_eq!(report.visited, 4);
    assert_eq!(report.failed, 0);
    assert!(!report.stopped);

    let a = &report.pages[&format!("{}/a", base)];
    assert_eq!(a.title, "A");
    assert!(a.text.contains("About A"));
    assert_eq!(
        a.links,
        vec![format!("{}/c", base), format!("{}/", base), format!("{}/a", base)]
    );
}

#[tokio::test]
async fn test_breadth_first_order_under_budget() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page("Home", &["/a", "/b"]), 1).await;
    mount_page(&server, "/a", html_page("A", &["/deep"]), 1).await;
    mount_page(&server, "/b", html_page("B", &[]), 1).await;
    mount_page(&server, "/deep", html_page("Deep", &[]), 0).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 3)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 3);
    assert!(report.pages.contains_key(&format!("{}/b", base)));
    assert!(!report.pages.contains_key(&format!("{}/deep", base)));
}

#[tokio::test]
async fn test_max_pages_budget() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html_page("Home", &["/1", "/2", "/3", "/4", "/5"]),
        1,
    )
    .await;
    mount_page(&server, "/1", html_page("One", &[]), 1).await;
    for page in ["/2", "/3", "/4", "/5"] {
        mount_page(&server, page, html_page("Later", &[]), 0).await;
    }

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 2)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert!(report.pages.contains_key(&format!("{}/1", base)));
}

#[tokio::test]
async fn test_disallowed_seed_yields_empty_report() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 200, "User-agent: *\nDisallow: /", 1).await;
    mount_page(&server, "/", html_page("Home", &[]), 0).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("A disallowed seed is not an error");

    assert!(report.pages.is_empty());
    assert_eq!(report.visited, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_disallowed_path_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 200, "User-agent: *\nDisallow: /private", 1).await;
    mount_page(&server, "/", html_page("Home", &["/private", "/public"]), 1).await;
    mount_page(&server, "/private", html_page("Secret", &[]), 0).await;
    mount_page(&server, "/public", html_page("Public", &[]), 1).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.failed, 1);
    assert!(!report.pages.contains_key(&format!("{}/private", base)));
}

#[tokio::test]
async fn test_named_agent_rules_do_not_apply() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 200, "User-agent: OtherBot\nDisallow: /", 1).await;
    mount_page(&server, "/", html_page("Home", &[]), 1).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 1);
}

#[tokio::test]
async fn test_missing_robots_allows_all_and_is_cached() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 404, "", 1).await;
    mount_page(&server, "/", html_page("Home", &["/a"]), 1).await;
    mount_page(&server, "/a", html_page("A", &[]), 1).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 2);
}

#[tokio::test]
async fn test_robots_server_error_fails_open_without_caching() {
    let server = MockServer::start().await;
    let base = server.uri();

    // One probe per page: the failure is never cached
    mount_robots(&server, 503, "", 2).await;
    mount_page(&server, "/", html_page("Home", &["/a"]), 1).await;
    mount_page(&server, "/a", html_page("A", &[]), 1).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 2);
}

#[tokio::test]
async fn test_robots_server_error_with_deny_policy() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 500, "", 1).await;
    mount_page(&server, "/", html_page("Home", &[]), 0).await;

    let mut crawler = test_crawler(Box::new(GenericPolicy), RobotsFailurePolicy::Deny);
    let report = crawler
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert!(report.pages.is_empty());
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_error_pages_are_skipped_not_retried() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page("Home", &["/missing", "/ok", "/missing"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok", html_page("Ok", &["/missing"]), 1).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.visited, 3);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_offsite_links_are_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let base = server.uri();

    let offsite = format!("{}/elsewhere", other.uri());
    mount_page(
        &server,
        "/",
        html_page("Home", &[offsite.as_str(), "https://example.org/x", "/local"]),
        1,
    )
    .await;
    mount_page(&server, "/local", html_page("Local", &[]), 1).await;
    mount_page(&other, "/elsewhere", html_page("Elsewhere", &[]), 0).await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert_eq!(
        report.pages[&format!("{}/", base)].links,
        vec![format!("{}/local", base)]
    );
}

#[tokio::test]
async fn test_site_policy_narrows_links_and_cleans_titles() {
    let server = MockServer::start().await;
    let base = server.uri();

    let policy = SitePolicy::new(
        vec!["/recipe/".to_string()],
        vec!["/recipes/".to_string()],
        "127.0.0.1".to_string(),
        " Recipe".to_string(),
    );

    mount_page(
        &server,
        "/recipes/desserts",
        html_page(
            "Desserts",
            &["/recipe/pie", "/about", "javascript:void(0)", "#top", "/"],
        ),
        1,
    )
    .await;
    mount_page(&server, "/recipe/pie", html_page("Apple Pie Recipe", &[]), 1).await;
    mount_page(&server, "/", html_page("Home", &["/recipes/desserts"]), 1).await;
    mount_page(&server, "/about", html_page("About", &[]), 0).await;

    let mut crawler = test_crawler(Box::new(policy), RobotsFailurePolicy::Allow);
    let report = crawler
        .crawl(&format!("{}/recipes/desserts", base), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 3);
    assert_eq!(
        report.pages[&format!("{}/recipe/pie", base)].title,
        "Apple Pie"
    );
}

#[tokio::test]
async fn test_user_agent_header_is_sent() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0 (Testing)"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Home", &[]))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = generic_crawler()
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages.len(), 1);
}

#[tokio::test]
async fn test_stop_flag_ends_crawl_before_next_request() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page("Home", &[]), 0).await;

    let stop = Arc::new(AtomicBool::new(true));
    let mut crawler = generic_crawler().with_stop_flag(stop);
    let report = crawler
        .crawl(&format!("{}/", base), 10)
        .await
        .expect("Crawl failed");

    assert!(report.stopped);
    assert!(report.pages.is_empty());
    assert_eq!(report.visited, 0);
}

#[tokio::test]
async fn test_invalid_seed_is_an_error() {
    let result = generic_crawler().crawl("not a url", 10).await;
    assert!(result.is_err());

    let result = generic_crawler().crawl("ftp://example.com/", 10).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_crawl_from_config() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html_page("Home", &["/a"]), 1).await;
    mount_page(&server, "/a", html_page("A", &[]), 0).await;

    let config = parse_config(&format!(
        r#"
[crawler]
seed-url = "{}/"
max-pages = 1
request-delay-ms = 100

[user-agent]
crawler-name = "TestBot"
"#,
        base
    ))
    .expect("Invalid test config");

    let report = crawl(&config).await.expect("Crawl failed");
    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[&format!("{}/", base)].title, "Home");
}

#[tokio::test]
async fn test_fetch_returns_page_only_for_allowed_200() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, 200, "User-agent: *\nDisallow: /no", 1).await;
    mount_page(&server, "/ok", html_page("Ok", &["/no"]), 1).await;
    mount_page(&server, "/no", html_page("No", &[]), 0).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_http_client(&test_user_agent()).expect("Failed to build client");
    let robots = RobotsGate::new(
        client.clone(),
        Duration::from_secs(5),
        RobotsFailurePolicy::Allow,
    );
    let mut fetcher = PageFetcher::new(
        client,
        robots,
        Box::new(GenericPolicy),
        Duration::from_secs(5),
        5000,
    );
    assert_eq!(fetcher.robots().cached_origins(), 0);

    let ok = url::Url::parse(&format!("{}/ok", base)).unwrap();
    let page = fetcher.fetch(&ok).await.expect("Allowed 200 page should be returned");
    assert_eq!(page.url, ok.to_string());
    assert_eq!(page.title, "Ok");
    assert_eq!(page.links, vec![format!("{}/no", base)]);

    let disallowed = url::Url::parse(&format!("{}/no", base)).unwrap();
    assert!(fetcher.fetch(&disallowed).await.is_none());

    let missing = url::Url::parse(&format!("{}/missing", base)).unwrap();
    assert!(fetcher.fetch(&missing).await.is_none());

    // One robots.txt entry for the single origin
    assert_eq!(fetcher.robots().cached_origins(), 1);
}
