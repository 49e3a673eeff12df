//! End-to-end crawl tests
//!
//! Every site is a wiremock server; `expect` counts on the mocks assert how
//! often each page was actually fetched.

use crate::{create_test_config, html_page};
use std::sync::Arc;
use std::time::Duration;
use veil_crawler::crawler::{crawl, Coordinator, CrawlSession};
use veil_crawler::output::{MemorySink, OutcomeKind};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page at `page_path` expected to be fetched `times` times
async fn mount_page(server: &MockServer, page_path: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(1)
        .mount(server)
        .await;
}

fn seed(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", html_page("Home", &["/page1", "/page2"]), 1).await;
    mount_page(&server, "/page1", html_page("Page 1", &["/", "/page2"]), 1).await;
    mount_page(&server, "/page2", html_page("Page 2", &["/page1"]), 1).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.count(OutcomeKind::Success), 3);
    assert_eq!(summary.unique_hosts(), 1);
    assert_eq!(summary.depth_breakdown.get(&0), Some(&1));
    assert_eq!(summary.depth_breakdown.get(&1), Some(&2));

    let home = sink.with_path("/");
    assert_eq!(home.len(), 1);
    assert_eq!(home[0].title.as_deref(), Some("Home"));
    assert_eq!(home[0].status, Some(200));
}

#[tokio::test]
async fn test_self_link_does_not_recurse() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Loop", &["/", "./", "/#top"]), 1).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.total_pages, 1);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_depth_bound_is_inclusive() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Depth 0", &["/d1"]), 1).await;
    mount_page(&server, "/d1", html_page("Depth 1", &["/d2"]), 1).await;
    mount_page(&server, "/d2", html_page("Depth 2", &["/d3"]), 1).await;
    mount_page(&server, "/d3", html_page("Depth 3", &[]), 0).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.total_pages, 3);
    assert_eq!(sink.with_path("/d2")[0].depth, 2);
    assert!(sink.with_path("/d3").is_empty());
}

#[tokio::test]
async fn test_depth_zero_fetches_seeds_only() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Seed", &["/child"]), 1).await;
    mount_page(&server, "/child", html_page("Child", &[]), 0).await;

    let mut config = create_test_config(vec![seed(&server)]);
    config.crawler.max_depth = 0;

    let sink = MemorySink::new();
    let summary = crawl(config, &sink).await.unwrap();

    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.total_links, 1);
}

#[tokio::test]
async fn test_shared_child_fetched_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Root", &["/a", "/b"]), 1).await;
    mount_page(&server, "/a", html_page("A", &["/shared"]), 1).await;
    mount_page(&server, "/b", html_page("B", &["/shared"]), 1).await;
    mount_page(&server, "/shared", html_page("Shared", &[]), 0).await;

    // /shared sits at depth 2, one beyond this bound
    let mut config = create_test_config(vec![seed(&server)]);
    config.crawler.max_depth = 1;
    let sink = MemorySink::new();
    crawl(config, &sink).await.unwrap();
    assert_eq!(sink.len(), 3);

    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Root", &["/a", "/b"]), 1).await;
    mount_page(&server, "/a", html_page("A", &["/shared"]), 1).await;
    mount_page(&server, "/b", html_page("B", &["/shared"]), 1).await;
    mount_page(&server, "/shared", html_page("Shared", &["/a", "/b"]), 1).await;

    let sink = MemorySink::new();
    crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();
    assert_eq!(sink.len(), 4);
    assert_eq!(sink.with_path("/shared").len(), 1);
}

#[tokio::test]
async fn test_equivalent_addresses_fetched_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html_page(
            "Root",
            &[
                "/article?b=2&a=1",
                "/article?a=1&b=2&utm_source=feed",
                "/article?a=1&b=2#comments",
            ],
        ),
        1,
    )
    .await;
    mount_page(&server, "/article", html_page("Article", &[]), 1).await;

    let sink = MemorySink::new();
    crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    let article = sink.with_path("/article");
    assert_eq!(article.len(), 1);
    assert_eq!(article[0].address.query(), Some("a=1&b=2"));
}

#[tokio::test]
async fn test_robots_disallow_blocks_address() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(&server, "/", html_page("Home", &["/private", "/public"]), 1).await;
    mount_page(&server, "/private", html_page("Secret", &["/hidden"]), 0).await;
    mount_page(&server, "/public", html_page("Public", &[]), 1).await;
    mount_page(&server, "/hidden", html_page("Hidden", &[]), 0).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    let private = sink.with_path("/private");
    assert_eq!(private.len(), 1);
    assert_eq!(private[0].outcome, OutcomeKind::Blocked);
    assert_eq!(summary.count(OutcomeKind::Blocked), 1);
    assert_eq!(summary.count(OutcomeKind::Success), 2);
}

#[tokio::test]
async fn test_robots_failure_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", html_page("Home", &["/private"]), 1).await;
    mount_page(&server, "/private", html_page("Private", &[]), 1).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.count(OutcomeKind::Success), 2);
    assert_eq!(summary.count(OutcomeKind::Blocked), 0);
}

#[tokio::test]
async fn test_http_error_is_recorded_and_not_expanded() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Home", &["/gone", "/ok"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string(html_page("404", &["/never"])))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok", html_page("Ok", &[]), 1).await;
    mount_page(&server, "/never", html_page("Never", &[]), 0).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    let gone = sink.with_path("/gone");
    assert_eq!(gone[0].outcome, OutcomeKind::HttpError);
    assert_eq!(gone[0].status, Some(404));
    assert_eq!(summary.count(OutcomeKind::HttpError), 1);
    assert_eq!(summary.count(OutcomeKind::Success), 2);
}

#[tokio::test]
async fn test_timeout_does_not_stop_siblings() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Home", &["/slow", "/fast"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Slow", &["/behind-slow"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/fast", html_page("Fast", &["/after-fast"]), 1).await;
    mount_page(&server, "/after-fast", html_page("After", &[]), 1).await;
    mount_page(&server, "/behind-slow", html_page("Behind", &[]), 0).await;

    let mut config = create_test_config(vec![seed(&server)]);
    config.crawler.request_timeout_ms = 500;

    let sink = MemorySink::new();
    let summary = crawl(config, &sink).await.unwrap();

    assert_eq!(sink.with_path("/slow")[0].outcome, OutcomeKind::Timeout);
    assert_eq!(summary.count(OutcomeKind::Timeout), 1);
    assert_eq!(summary.count(OutcomeKind::Success), 3);
}

#[tokio::test]
async fn test_unreachable_link_is_network_error() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html_page("Home", &["http://127.0.0.1:1/down", "/up"]),
        1,
    )
    .await;
    mount_page(&server, "/up", html_page("Up", &[]), 1).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.count(OutcomeKind::NetworkError), 1);
    assert_eq!(summary.count(OutcomeKind::Success), 2);
    assert_eq!(summary.unique_hosts(), 1);
}

#[tokio::test]
async fn test_requests_carry_pool_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "VeilTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Home", &["/next"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .and(header("user-agent", "VeilTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Next", &[])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(vec![seed(&server)]);
    config.identity.user_agents = Some(vec!["VeilTest/1.0".to_string()]);

    let sink = MemorySink::new();
    let summary = crawl(config, &sink).await.unwrap();
    assert_eq!(summary.count(OutcomeKind::Success), 2);
}

#[tokio::test]
async fn test_invalid_and_duplicate_seeds() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Home", &[]), 1).await;

    let config = create_test_config(vec![
        "mailto:someone@example.com".to_string(),
        seed(&server),
        server.uri(),
        "::not-an-address::".to_string(),
    ]);

    let sink = MemorySink::new();
    let summary = crawl(config, &sink).await.unwrap();
    assert_eq!(summary.total_pages, 1);
}

#[tokio::test]
async fn test_single_in_flight_slot_completes() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Home", &["/a", "/b", "/c"]), 1).await;
    for page in ["/a", "/b", "/c"] {
        mount_page(&server, page, html_page(page, &["/a", "/b", "/c"]), 1).await;
    }

    let mut config = create_test_config(vec![seed(&server)]);
    config.crawler.max_in_flight = 1;

    let sink = MemorySink::new();
    let summary = crawl(config, &sink).await.unwrap();
    assert_eq!(summary.total_pages, 4);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Home", &[]), 2).await;

    let config = create_test_config(vec![seed(&server)]);
    let first = Arc::new(CrawlSession::build(config.clone()).await.unwrap());
    let second = Arc::new(CrawlSession::build(config).await.unwrap());

    let sink = MemorySink::new();
    Coordinator::new(Arc::clone(&first)).run(&sink).await;
    Coordinator::new(Arc::clone(&second)).run(&sink).await;

    assert_eq!(sink.len(), 2);
    assert_eq!(first.visited().len(), 1);
    assert_eq!(second.visited().len(), 1);
    assert_eq!(first.gate().cache().len(), 1);
}

/// Mounts a redirect from `from` to `location`, expected to be hit `times` times
async fn mount_redirect(server: &MockServer, from: &str, status: u16, location: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(status).insert_header("Location", location))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_redirect_to_disallowed_address_is_blocked() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(&server, "/", html_page("Home", &["/go"]), 1).await;
    mount_redirect(&server, "/go", 302, "/private", 1).await;
    mount_page(&server, "/private", html_page("Secret", &["/deeper"]), 0).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.count(OutcomeKind::Redirect), 1);
    assert_eq!(summary.count(OutcomeKind::Blocked), 1);

    let go = &sink.with_path("/go")[0];
    assert_eq!(go.outcome, OutcomeKind::Redirect);
    assert_eq!(go.status, Some(302));
    assert_eq!(go.title, None);
    assert_eq!(go.location.as_ref().map(|l| l.path()), Some("/private"));

    let private = &sink.with_path("/private")[0];
    assert_eq!(private.outcome, OutcomeKind::Blocked);
    assert_eq!(private.depth, go.depth);
}

#[tokio::test]
async fn test_redirect_target_fetched_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html_page("Home", &["/old", "/new"]), 1).await;
    mount_redirect(&server, "/old", 301, "/new", 1).await;
    mount_page(&server, "/new", html_page("New", &[]), 1).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.count(OutcomeKind::Success), 2);
    assert_eq!(summary.count(OutcomeKind::Redirect), 1);
    assert_eq!(sink.with_path("/new").len(), 1);
    assert_eq!(sink.with_path("/new")[0].depth, 1);
}

#[tokio::test]
async fn test_redirect_loop_terminates() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/", 302, "/loop", 1).await;
    mount_redirect(&server, "/loop", 302, "/", 1).await;

    let sink = MemorySink::new();
    let summary = crawl(create_test_config(vec![seed(&server)]), &sink)
        .await
        .unwrap();

    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.count(OutcomeKind::Redirect), 2);
    assert!(sink.records().iter().all(|r| r.depth == 0));
}
