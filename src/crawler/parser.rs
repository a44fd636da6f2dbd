//! HTML parser for extracting outbound links
//!
//! Link discovery is intentionally narrow: only `<a>` elements with an
//! `href` attribute count. Stylesheets, scripts, images, and canonical
//! hints never enter the frontier.

use crate::url::resolve_href;
use scraper::{Html, Selector};
use url::Url;

/// Extracts all followable links from an HTML document
///
/// Each href is resolved against `page_url`; hrefs that are empty,
/// malformed, bare fragments, or non-http(s) after resolution are skipped
/// without failing the page. Duplicates are kept; the frontier's unique
/// constraint absorbs them downstream.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - URL the document was fetched from, for resolving relative hrefs
///
/// # Returns
///
/// Absolute http(s) URLs in document order
///
/// # Example
///
/// ```
/// use crawld::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("http://example.com/").unwrap();
/// let links = extract_links(html, &page_url);
/// assert_eq!(links[0].as_str(), "http://example.com/page");
/// ```
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_href(page_url, href) {
                    links.push(absolute);
                }
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("http://example.com/page").unwrap()
    }

    fn link_strings(html: &str) -> Vec<String> {
        extract_links(html, &page_url())
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="http://other.com/page">Link</a></body></html>"#;
        assert_eq!(link_strings(html), vec!["http://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        assert_eq!(link_strings(html), vec!["http://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        assert_eq!(link_strings(html), vec!["http://example.com/other"]);
    }

    #[test]
    fn test_skip_javascript_link() {
        let html = r#"<html><body><a href="javascript:void(0)">Link</a></body></html>"#;
        assert!(link_strings(html).is_empty());
    }

    #[test]
    fn test_skip_mailto_link() {
        let html = r#"<html><body><a href="mailto:test@example.com">Email</a></body></html>"#;
        assert!(link_strings(html).is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        assert!(link_strings(html).is_empty());
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<html><body><a name="top">Anchor</a></body></html>"#;
        assert!(link_strings(html).is_empty());
    }

    #[test]
    fn test_other_elements_with_urls_ignored() {
        let html = r#"
            <html>
            <head><link rel="stylesheet" href="/style.css"><script src="/app.js"></script></head>
            <body><img src="/pic.png"><a href="/real">Real</a></body>
            </html>
        "#;
        assert_eq!(link_strings(html), vec!["http://example.com/real"]);
    }

    #[test]
    fn test_multiple_links_in_document_order() {
        let html = r#"
            <html>
            <body>
                <a href="/page1">Link 1</a>
                <a href="/page2">Link 2</a>
                <a href="http://other.com/page3">Link 3</a>
            </body>
            </html>
        "#;
        assert_eq!(
            link_strings(html),
            vec![
                "http://example.com/page1",
                "http://example.com/page2",
                "http://other.com/page3"
            ]
        );
    }

    #[test]
    fn test_mixed_valid_and_invalid_links() {
        let html = r#"
            <html>
            <body>
                <a href="/valid">Valid</a>
                <a href="javascript:alert('no')">Invalid</a>
                <a href="mailto:test@example.com">Invalid</a>
                <a href="/another-valid">Valid</a>
            </body>
            </html>
        "#;
        assert_eq!(link_strings(html).len(), 2);
    }

    #[test]
    fn test_duplicate_links_kept() {
        let html = r#"<html><body><a href="/x">A</a><a href="/x">B</a></body></html>"#;
        assert_eq!(link_strings(html).len(), 2);
    }

    #[test]
    fn test_malformed_document_still_yields_links() {
        // The parser is lenient; an unclosed tag does not lose the hrefs.
        let html = r#"<html><body><div><a href="/a">A</a><a href="/b">B"#;
        assert_eq!(link_strings(html).len(), 2);
    }

    #[test]
    fn test_nofollow_links_followed() {
        let html = r#"<html><body><a href="/page" rel="nofollow">Link</a></body></html>"#;
        assert_eq!(link_strings(html), vec!["http://example.com/page"]);
    }
}
