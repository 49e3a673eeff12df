use url::Url;

/// Returns the origin of a URL as `scheme://host[:port]`
///
/// The port is only included when it differs from the scheme default. This is
/// the key robots.txt policies are cached under: a policy file only governs the
/// origin it was served from.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use veil_crawler::url::origin_key;
///
/// let url = Url::parse("https://Example.com/path?q=1").unwrap();
/// assert_eq!(origin_key(&url), Some("https://example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(origin_key(&url), Some("http://127.0.0.1:8080".to_string()));
/// ```
pub fn origin_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Derives the robots.txt address for the origin of `url`
///
/// Returns `None` for URLs without a host.
pub fn policy_url(url: &Url) -> Option<Url> {
    url.host_str()?;
    url.join("/robots.txt").ok()
}

/// Returns the lowercase host of a URL with any `www.` prefix removed
///
/// Used to count distinct sites in the crawl summary, where `www.example.com`
/// and `example.com` are the same site.
pub fn display_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    })
}
