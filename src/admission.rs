//! The admission gate in front of every fetch: blacklist substrings plus a
//! lazily populated robots.txt cache.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use robotstxt::DefaultMatcher;

use crate::network::HttpClient;
use crate::url_utils;

/// Cached robots.txt body per host. `None` marks a host whose robots.txt
/// could not be fetched or did not return 200; lookups against it allow
/// everything, because such a host has expressed no policy.
type RobotsCache = DashMap<String, Option<String>>;

pub struct AdmissionFilter {
    blacklist: Vec<String>,
    bypass: HashSet<String>,
    robots: RobotsCache,
    http: Arc<HttpClient>,
    user_agent: String,
}

impl AdmissionFilter {
    pub fn new(
        blacklist: Vec<String>,
        bypass: impl IntoIterator<Item = String>,
        http: Arc<HttpClient>,
        user_agent: String,
    ) -> Self {
        Self {
            blacklist,
            bypass: bypass.into_iter().collect(),
            robots: DashMap::new(),
            http,
            user_agent,
        }
    }

    /// True iff any blacklist pattern occurs as a substring of the URL.
    pub fn is_blacklisted(&self, url: &str) -> bool {
        self.blacklist.iter().any(|pattern| url.contains(pattern))
    }

    /// Robots.txt admission for one URL.
    ///
    /// Bypass hosts skip robots entirely. A cache miss fetches robots.txt
    /// once; concurrent first-touches of a host may each fetch and install
    /// an entry, which is fine since all outcomes converge.
    pub async fn can_crawl(&self, url: &str) -> bool {
        let host = match url_utils::extract_host(url) {
            Some(h) => h,
            None => return false,
        };

        if self.bypass.contains(&host) {
            return true;
        }

        if let Some(cached) = self.robots.get(&host) {
            return self.allowed(cached.value().as_deref(), url);
        }

        let body = self.fetch_robots(url).await;
        let verdict = self.allowed(body.as_deref(), url);
        self.robots.insert(host, body);
        verdict
    }

    async fn fetch_robots(&self, url: &str) -> Option<String> {
        let robots_url = url_utils::robots_url(url)?;
        match self.http.fetch_text(&robots_url).await {
            Ok(response) if response.status_code == 200 => Some(response.content),
            _ => None,
        }
    }

    fn allowed(&self, robots_body: Option<&str>, url: &str) -> bool {
        match robots_body {
            Some(body) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, &self.user_agent, url)
            }
            None => true,
        }
    }

    #[cfg(test)]
    fn cached_hosts(&self) -> usize {
        self.robots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(blacklist: Vec<&str>, bypass: Vec<&str>) -> AdmissionFilter {
        let http = Arc::new(HttpClient::new("AmberRake", 2).unwrap());
        AdmissionFilter::new(
            blacklist.into_iter().map(str::to_string).collect(),
            bypass.into_iter().map(str::to_string),
            http,
            "AmberRake".to_string(),
        )
    }

    #[test]
    fn test_blacklist_substring_match() {
        let admission = filter(vec!["/private", "tracker."], vec![]);

        assert!(admission.is_blacklisted("http://a.local/private/page"));
        assert!(admission.is_blacklisted("http://tracker.example/x"));
        assert!(!admission.is_blacklisted("http://a.local/public"));
    }

    #[test]
    fn test_empty_blacklist_blocks_nothing() {
        let admission = filter(vec![], vec![]);
        assert!(!admission.is_blacklisted("http://anything.local/at/all"));
    }

    #[tokio::test]
    async fn test_bypass_host_skips_robots() {
        let admission = filter(vec![], vec!["mine.local"]);

        // No robots fetch happens for a bypassed host, so no cache entry
        // appears either.
        assert!(admission.can_crawl("http://mine.local/anything").await);
        assert_eq!(admission.cached_hosts(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_url_is_denied() {
        let admission = filter(vec![], vec![]);
        assert!(!admission.can_crawl("not a url").await);
    }

    #[test]
    fn test_cached_rules_consulted() {
        let admission = filter(vec![], vec![]);
        admission.robots.insert(
            "b.local".to_string(),
            Some("User-agent: AmberRake\nDisallow: /x\n".to_string()),
        );

        assert!(!admission.allowed(
            admission.robots.get("b.local").unwrap().value().as_deref(),
            "http://b.local/x/1"
        ));
        assert!(admission.allowed(
            admission.robots.get("b.local").unwrap().value().as_deref(),
            "http://b.local/ok"
        ));
    }

    #[test]
    fn test_failed_fetch_marker_allows() {
        let admission = filter(vec![], vec![]);
        admission.robots.insert("c.local".to_string(), None);

        assert!(admission.allowed(
            admission.robots.get("c.local").unwrap().value().as_deref(),
            "http://c.local/anything"
        ));
    }
}
