use url::Url;

/// Resolves an href attribute against the page it appeared on
///
/// Relative references resolve the way a browser would; absolute hrefs pass
/// through. Anything that is not an http(s) URL after resolution is dropped,
/// which quietly covers `mailto:`, `javascript:`, `tel:`, and `data:` hrefs.
/// Fragments are stripped so the same document cannot re-enter the frontier
/// once per anchor.
///
/// # Arguments
///
/// * `base` - URL of the fetched page
/// * `href` - Raw href attribute value
///
/// # Returns
///
/// The absolute URL, or `None` if the href is empty, malformed, a bare
/// fragment, or resolves to a non-http(s) scheme
///
/// # Examples
///
/// ```
/// use url::Url;
/// use crawld::url::resolve_href;
///
/// let base = Url::parse("http://example.com/a").unwrap();
/// assert_eq!(
///     resolve_href(&base, "/b").unwrap().as_str(),
///     "http://example.com/b"
/// );
/// assert!(resolve_href(&base, "mailto:bob@example.com").is_none());
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    // Empty hrefs and bare fragments point back at the page itself.
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut resolved = base.join(href).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved)
}

/// Returns true if both URLs point at exactly the same host
///
/// Ports and schemes are ignored; `http://example.com:8080/x` and
/// `https://example.com/y` share a host. No suffix logic is applied, so
/// `sub.example.com` and `example.com` are different hosts.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com/a").unwrap()
    }

    #[test]
    fn test_relative_href_resolves_against_page() {
        let resolved = resolve_href(&base(), "/b").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/b");
    }

    #[test]
    fn test_relative_path_without_slash() {
        let base = Url::parse("http://example.com/dir/page.html").unwrap();
        let resolved = resolve_href(&base, "other.html").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/dir/other.html");
    }

    #[test]
    fn test_absolute_href_passes_through() {
        let resolved = resolve_href(&base(), "http://other.com/x").unwrap();
        assert_eq!(resolved.as_str(), "http://other.com/x");
    }

    #[test]
    fn test_mailto_rejected() {
        assert!(resolve_href(&base(), "mailto:bob@example.com").is_none());
    }

    #[test]
    fn test_javascript_and_tel_rejected() {
        assert!(resolve_href(&base(), "javascript:void(0)").is_none());
        assert!(resolve_href(&base(), "tel:+15551234567").is_none());
        assert!(resolve_href(&base(), "data:text/plain,hi").is_none());
    }

    #[test]
    fn test_empty_and_fragment_only_rejected() {
        assert!(resolve_href(&base(), "").is_none());
        assert!(resolve_href(&base(), "   ").is_none());
        assert!(resolve_href(&base(), "#section").is_none());
    }

    #[test]
    fn test_fragment_stripped_from_resolved_url() {
        let resolved = resolve_href(&base(), "/b#section").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/b");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let resolved = resolve_href(&base(), "  /b  ").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/b");
    }

    #[test]
    fn test_protocol_relative_href() {
        let resolved = resolve_href(&base(), "//cdn.example.com/lib.js").unwrap();
        assert_eq!(resolved.as_str(), "http://cdn.example.com/lib.js");
    }

    #[test]
    fn test_query_preserved() {
        let resolved = resolve_href(&base(), "/search?q=rust").unwrap();
        assert_eq!(resolved.as_str(), "http://example.com/search?q=rust");
    }

    #[test]
    fn test_same_host_exact_match() {
        let a = Url::parse("http://example.com/a").unwrap();
        let b = Url::parse("http://example.com/b").unwrap();
        assert!(same_host(&a, &b));
    }

    #[test]
    fn test_same_host_rejects_other_host() {
        let a = Url::parse("http://example.com/a").unwrap();
        let b = Url::parse("http://other.com/x").unwrap();
        assert!(!same_host(&a, &b));
    }

    #[test]
    fn test_same_host_rejects_subdomain() {
        let a = Url::parse("http://example.com/").unwrap();
        let b = Url::parse("http://sub.example.com/").unwrap();
        assert!(!same_host(&a, &b));
    }

    #[test]
    fn test_same_host_ignores_port_and_scheme() {
        let a = Url::parse("http://example.com/a").unwrap();
        let b = Url::parse("https://example.com:8443/b").unwrap();
        assert!(same_host(&a, &b));
    }
}
