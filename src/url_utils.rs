//! URL helper functions used throughout the crawler

use url::Url;

/// Resolve a link against the provided base URL.
///
/// Absolute links come back canonicalized; relative links (including
/// fragment-only ones) resolve against the base. The empty string is the
/// sentinel for "unusable link" and callers discard it.
pub fn resolve(base: &str, link: &str) -> String {
    let parsed_base = match Url::parse(base) {
        Ok(u) => u,
        Err(_) => return String::new(),
    };

    parsed_base
        .join(link)
        .map(|u| u.to_string())
        .unwrap_or_default()
}

/// Extract the host portion of a URL
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Build the robots.txt URL for the host serving the given URL
pub fn robots_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let scheme = parsed.scheme();
    let host = parsed.host_str()?;
    Some(format!("{}://{}/robots.txt", scheme, host))
}

/// Normalize a URL at the enqueue boundary.
///
/// Strips the fragment, lowercases the host (the parser does this), and
/// drops the trailing `/` on a bare root path so `http://a/` and `http://a`
/// key the same visited entry. Returns `None` for unparseable input.
pub fn normalize(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_fragment(None);

    let bare_root = parsed.path() == "/" && parsed.query().is_none();
    let mut out = parsed.to_string();
    if bare_root {
        while out.ends_with('/') {
            out.pop();
        }
    }
    Some(out)
}

/// Check if a content type represents HTML
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}
