//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the compliance
//! gate, the proxy pool and the full crawl cycle end-to-end.

mod crawl_tests;

use veil_crawler::config::Config;

/// Creates a fast test configuration crawling `seeds`
pub fn create_test_config(seeds: Vec<String>) -> Config {
    let mut config = Config::default();
    config.seeds = seeds;
    config.crawler.max_depth = 2;
    config.crawler.max_in_flight = 4;
    config.crawler.request_timeout_ms = 2_000;
    config.crawler.min_delay_ms = 0;
    config.crawler.max_delay_ms = 0;
    config
}

/// Renders a minimal HTML page with a title and anchors
pub fn html_page(title: &str, hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    )
}
