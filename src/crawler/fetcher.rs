//! HTTP fetch executor
//!
//! This module performs exactly one bounded-time retrieval per call and
//! classifies the result. It never retries; a failed fetch is reported as a
//! [`FetchOutcome`] and the caller decides what to do with it.

use crate::crawler::parser::parse_html;
use crate::proxy::Egress;
use reqwest::header::{LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Proxy, Response};
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

/// Result of a single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was retrieved and parsed
    Success {
        /// HTTP status code
        status: u16,
        /// Raw page body
        body: String,
        /// Page title, or [`NO_TITLE`]
        title: String,
        /// Absolute outbound links, resolved against the requested address
        links: BTreeSet<Url>,
    },

    /// The server answered with a 3xx status and a usable `Location`
    ///
    /// Redirects are never followed by the client. The caller decides whether
    /// `location` is worth a separate visit.
    Redirect {
        /// The HTTP status code
        status: u16,
        /// Redirect target, resolved against the requested address
        location: Url,
    },

    /// The compliance gate refused the address
    Blocked,

    /// The server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status: u16,
    },

    /// Transport failure (DNS, connection refused, TLS, missing egress)
    NetworkError {
        /// Error description
        cause: String,
    },

    /// The per-request timeout expired
    Timeout,
}

/// Title reported for pages without a `<title>` element
pub const NO_TITLE: &str = "No Title";

/// Builds an HTTP client, optionally routed through `proxy`
///
/// The client carries no default User-Agent and no overall timeout: both are
/// set per request. It never follows redirects, so every address it touches
/// has been through the compliance gate and the visited set. A client built
/// without a proxy ignores the `HTTP_PROXY` family of environment variables,
/// so "direct" really means direct.
///
/// # Example
///
/// ```no_run
/// use veil_crawler::crawler::build_http_client;
///
/// let direct = build_http_client(None).unwrap();
/// let proxied = build_http_client(Some(
///     reqwest::Proxy::all("http://proxy.example.com:8080").unwrap(),
/// ))
/// .unwrap();
/// ```
pub fn build_http_client(proxy: Option<Proxy>) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .redirect(Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    let builder = match proxy {
        Some(proxy) => builder.proxy(proxy),
        None => builder.no_proxy(),
    };

    builder.build()
}

/// Executes fetches through a direct client or a validated egress
#[derive(Debug, Clone)]
pub struct Fetcher {
    direct: Client,
}

impl Fetcher {
    /// Creates a fetcher whose direct path uses `direct`
    pub fn new(direct: Client) -> Self {
        Self { direct }
    }

    /// Fetches `url` once, presenting `identity` as the User-Agent
    ///
    /// # Classification
    ///
    /// | Condition                     | Outcome        |
    /// |-------------------------------|----------------|
    /// | 2xx with a readable body      | `Success`      |
    /// | 3xx with a usable `Location`  | `Redirect`     |
    /// | any other non-2xx status      | `HttpError`    |
    /// | timeout (send or body read)   | `Timeout`      |
    /// | any other transport failure   | `NetworkError` |
    ///
    /// When `egress` is `None` the request goes out on the direct client.
    pub async fn fetch(
        &self,
        url: &Url,
        identity: &str,
        egress: Option<&Egress>,
        timeout: Duration,
    ) -> FetchOutcome {
        let client = egress.map(|e| &e.client).unwrap_or(&self.direct);

        let response = match client
            .get(url.clone())
            .header(USER_AGENT, identity)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status();
        if status.is_redirection() {
            return match redirect_location(&response, url) {
                Some(location) => FetchOutcome::Redirect {
                    status: status.as_u16(),
                    location,
                },
                None => FetchOutcome::HttpError {
                    status: status.as_u16(),
                },
            };
        }

        if !status.is_success() {
            return FetchOutcome::HttpError {
                status: status.as_u16(),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return classify_error(e),
        };

        let parsed = parse_html(&body, url);

        FetchOutcome::Success {
            status: status.as_u16(),
            body,
            title: parsed.title,
            links: parsed.links,
        }
    }
}

/// Resolves the `Location` header of a 3xx response against `base`
///
/// Missing, unreadable and non-http(s) locations yield `None`.
fn redirect_location(response: &Response, base: &Url) -> Option<Url> {
    let value = response.headers().get(LOCATION)?.to_str().ok()?;
    let location = base.join(value.trim()).ok()?;
    matches!(location.scheme(), "http" | "https").then_some(location)
}

fn classify_error(error: reqwest::Error) -> FetchOutcome {
    if error.is_timeout() {
        FetchOutcome::Timeout
    } else {
        FetchOutcome::NetworkError {
            cause: error.to_string(),
        }
    }
}
