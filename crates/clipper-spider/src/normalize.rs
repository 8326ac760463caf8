//! URL normalisation (§4.4 step 3). Relative URLs are resolved
//! against `base_url`; already-absolute URLs pass through byte-exact
//! except for `&amp;` decoding — making normalisation idempotent
//! (§8 round-trip law).

use url::Url;

/// Resolve `href` to an absolute URL against `base_url`, decoding any
/// `&amp;` entity. Returns `None` for hrefs that cannot be resolved
/// (e.g. `javascript:`, `mailto:` where a real navigation target is
/// expected, or malformed URLs).
pub fn normalize(href: &str, base_url: &Url) -> Option<Url> {
    let decoded = href.replace("&amp;", "&");
    let trimmed = decoded.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    if trimmed.starts_with("javascript:") || trimmed.starts_with("mailto:") {
        return None;
    }

    base_url.join(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_path() {
        let base = Url::parse("https://example.com/section/").unwrap();
        let resolved = normalize("/articles/1", &base).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/articles/1");
    }

    #[test]
    fn decodes_amp_entity() {
        let base = Url::parse("https://example.com/").unwrap();
        let resolved = normalize("/a?x=1&amp;y=2", &base).unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/a?x=1&y=2");
    }

    #[test]
    fn already_absolute_url_is_idempotent() {
        let base = Url::parse("https://example.com/").unwrap();
        let once = normalize("https://other.com/a?x=1&amp;y=2", &base).unwrap();
        let twice = normalize(once.as_str(), &base).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_fragment_only_and_javascript_hrefs() {
        let base = Url::parse("https://example.com/").unwrap();
        assert!(normalize("#top", &base).is_none());
        assert!(normalize("javascript:void(0)", &base).is_none());
    }
}
