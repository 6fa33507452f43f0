//! Per-page metadata and link extraction over a parsed DOM.

use scraper::{Html, Selector};

use crate::models::{MetaTag, PageRecord};
use crate::network::FetchedPage;
use crate::url_utils;

/// Build a `PageRecord` and the outbound link list for one fetched page.
///
/// Links are resolved to absolute form here and unusable resolutions are
/// discarded; they feed the work queue only and are not persisted.
pub fn extract(url: &str, page: &FetchedPage) -> (PageRecord, Vec<String>) {
    let document = Html::parse_document(&page.body);

    let title_selector = Selector::parse("title").unwrap();
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let description_selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    let description = document
        .select(&description_selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .to_string();

    // Every meta tag that carries both attributes, in document order.
    let meta_selector = Selector::parse("meta").unwrap();
    let mut meta = Vec::new();
    for el in document.select(&meta_selector) {
        if let (Some(name), Some(content)) = (el.value().attr("name"), el.value().attr("content")) {
            meta.push(MetaTag {
                name: name.to_string(),
                content: content.to_string(),
            });
        }
    }

    let html_selector = Selector::parse("html").unwrap();
    let language = document
        .select(&html_selector)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .unwrap_or_default()
        .to_string();

    let icon_selector = Selector::parse(r#"link[rel="icon"], link[rel="shortcut icon"]"#).unwrap();
    let favicon = document
        .select(&icon_selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| url_utils::resolve(url, href))
        .unwrap_or_default();

    let anchor_selector = Selector::parse("a[href]").unwrap();
    let links: Vec<String> = document
        .select(&anchor_selector)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| url_utils::resolve(url, href))
        .filter(|resolved| !resolved.is_empty())
        .collect();

    let record = PageRecord {
        url: url.to_string(),
        title,
        description,
        meta,
        last_modified: page.last_modified,
        language,
        favicon,
    };

    (record, links)
}
