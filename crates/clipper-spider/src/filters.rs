//! Include/exclude pattern matching (§4.4 step 2). Plain substring
//! matches against the candidate's resolved URL.

/// True when `url` passes the include/exclude filters: it must
/// contain at least one `include_patterns` substring (when any are
/// given) and none of the `exclude_patterns` substrings.
pub fn passes_patterns(url: &str, include_patterns: &[String], exclude_patterns: &[String]) -> bool {
    if !include_patterns.is_empty() && !include_patterns.iter().any(|p| url.contains(p.as_str())) {
        return false;
    }
    if exclude_patterns.iter().any(|p| url.contains(p.as_str())) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patterns_allow_everything() {
        assert!(passes_patterns("https://example.com/a", &[], &[]));
    }

    #[test]
    fn include_pattern_must_match() {
        let include = vec!["/articles/".to_string()];
        assert!(passes_patterns("https://example.com/articles/1", &include, &[]));
        assert!(!passes_patterns("https://example.com/tags/1", &include, &[]));
    }

    #[test]
    fn exclude_pattern_rejects_match() {
        let exclude = vec!["/login".to_string()];
        assert!(!passes_patterns("https://example.com/login", &[], &exclude));
    }
}
