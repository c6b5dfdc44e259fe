//! API endpoint discovery.
//!
//! Best-effort, staged discovery for a base URL: caller-supplied endpoints
//! win, then `sitemap.xml`, then crawling the landing page for `/api/`
//! links, then probing a fixed list of common patterns. Each stage
//! swallows its own network failures and falls through to the next; the
//! result may be empty.

use regex::Regex;
use std::collections::HashSet;
use url::Url;

use super::probe::ProbeClient;

/// Common API path patterns probed as a last resort.
pub const COMMON_API_PATTERNS: &[&str] = &[
    "/api",
    "/api/",
    "/api/v1",
    "/api/v2",
    "/api/users",
    "/api/posts",
    "/api/data",
    "/api/health",
    "/api/status",
    "/api/info",
    "/api/docs",
    "/api/swagger",
    "/posts",
    "/users",
    "/data",
    "/health",
    "/status",
];

/// Statuses that mark a pattern probe as a live endpoint. 401/403 still
/// prove the route exists, it just wants credentials.
const LIVE_PATTERN_STATUSES: [u16; 3] = [200, 401, 403];

/// Resolve a discovered link against the base URL.
pub fn resolve_endpoint(base: &str, link: &str) -> String {
    if link.starts_with("http") {
        return link.to_string();
    }
    match Url::parse(base).and_then(|base_url| base_url.join(link)) {
        Ok(resolved) => resolved.to_string(),
        // Unparseable base: fall back to plain concatenation.
        Err(_) => format!("{}/{}", base.trim_end_matches('/'), link.trim_start_matches('/')),
    }
}

/// Discover candidate API endpoints for a base URL.
pub async fn discover_endpoints(
    client: &ProbeClient,
    base: &str,
    custom_endpoints: &[String],
) -> Vec<String> {
    if !custom_endpoints.is_empty() {
        let resolved: Vec<String> = custom_endpoints
            .iter()
            .map(|endpoint| resolve_endpoint(base, endpoint))
            .collect();
        tracing::debug!(count = resolved.len(), "using custom endpoints");
        return resolved;
    }

    let from_sitemap = sitemap_endpoints(client, base).await;
    if !from_sitemap.is_empty() {
        tracing::debug!(count = from_sitemap.len(), "found API endpoints in sitemap");
        return from_sitemap;
    }

    let crawled = crawl_endpoints(client, base).await;
    if !crawled.is_empty() {
        tracing::debug!(count = crawled.len(), "found API endpoints by crawling");
        return crawled;
    }

    let from_patterns = pattern_endpoints(client, base).await;
    if from_patterns.is_empty() {
        tracing::debug!("no API endpoints found via any discovery method");
    } else {
        tracing::debug!(count = from_patterns.len(), "found API endpoints by pattern probing");
    }
    from_patterns
}

/// Extract `/api/` URLs from the site's `sitemap.xml`.
async fn sitemap_endpoints(client: &ProbeClient, base: &str) -> Vec<String> {
    let sitemap_url = format!("{}/sitemap.xml", base.trim_end_matches('/'));
    let (status, xml) = match client.get_text(&sitemap_url).await {
        Ok(result) => result,
        Err(_) => return Vec::new(),
    };
    if !(200..300).contains(&status) {
        return Vec::new();
    }

    let loc = Regex::new(r"<loc>(.*?)</loc>").expect("valid sitemap loc pattern");
    loc.captures_iter(&xml)
        .map(|captures| captures[1].to_string())
        .filter(|url| url.contains("/api/"))
        .collect()
}

/// Crawl the landing page's `href` attributes for `/api/` links.
async fn crawl_endpoints(client: &ProbeClient, base: &str) -> Vec<String> {
    let (status, html) = match client.get_text(base).await {
        Ok(result) => result,
        Err(failure) => {
            tracing::debug!(error = ?failure.message, "crawling failed");
            return Vec::new();
        }
    };
    if !(200..300).contains(&status) {
        return Vec::new();
    }

    let href = Regex::new(r#"(?i)href=["']([^"']*/api/[^"']*)["']"#).expect("valid href pattern");
    let mut seen = HashSet::new();
    href.captures_iter(&html)
        .map(|captures| resolve_endpoint(base, &captures[1]))
        .filter(|url| url.contains("/api/"))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Probe common API path patterns with `HEAD` requests.
async fn pattern_endpoints(client: &ProbeClient, base: &str) -> Vec<String> {
    let mut live = Vec::new();
    for pattern in COMMON_API_PATTERNS {
        let url = format!("{}{}", base.trim_end_matches('/'), pattern);
        match client.head_status(&url).await {
            Ok(status) if LIVE_PATTERN_STATUSES.contains(&status) => live.push(url),
            _ => {}
        }
    }
    live
}
