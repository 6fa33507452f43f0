use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One crawled page, as persisted to the record log.
///
/// Outbound links are intentionally not part of the record; they only feed
/// the work queue and would dominate the log size if retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Canonical absolute URL of the page
    pub url: String,

    /// Text of the first `<title>` element, trimmed
    pub title: String,

    /// Content of the first `<meta name="description">`, or empty
    pub description: String,

    /// Every `<meta>` carrying both a name and a content attribute,
    /// in document order
    pub meta: Vec<MetaTag>,

    /// Parsed `Last-Modified` response header; fetch time when the header
    /// was absent or unparseable
    pub last_modified: DateTime<Utc>,

    /// `lang` attribute of the root `<html>` element, or empty
    pub language: String,

    /// Absolute favicon URL, or empty
    pub favicon: String,
}

/// A single `{name, content}` meta tag pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_msgpack_round_trip() {
        let record = PageRecord {
            url: "https://test.local/page".to_string(),
            title: "A Page".to_string(),
            description: "about a page".to_string(),
            meta: vec![MetaTag {
                name: "author".to_string(),
                content: "someone".to_string(),
            }],
            last_modified: "2024-03-01T12:00:00Z".parse().unwrap(),
            language: "en".to_string(),
            favicon: "https://test.local/favicon.ico".to_string(),
        };

        let bytes = rmp_serde::to_vec_named(&record).unwrap();
        let decoded: PageRecord = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_msgpack_carries_field_names() {
        let record = PageRecord {
            url: "https://test.local".to_string(),
            title: String::new(),
            description: String::new(),
            meta: Vec::new(),
            last_modified: Utc::now(),
            language: String::new(),
            favicon: String::new(),
        };

        let bytes = rmp_serde::to_vec_named(&record).unwrap();
        let haystack = String::from_utf8_lossy(&bytes).into_owned();
        for field in ["url", "title", "meta", "last_modified", "favicon"] {
            assert!(haystack.contains(field), "missing field name {field}");
        }
    }
}
