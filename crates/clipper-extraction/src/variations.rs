//! Selector variation generation for recovery when a config selector
//! matches nothing (§4.3 step 1).

/// Generate ordered variations of `selector` to retry before falling
/// back to the field's fallback list: underscore↔hyphen swap,
/// class-attribute substring match, pseudo-class removal, and
/// descendant↔direct-child flipping.
pub fn generate_variations(selector: &str) -> Vec<String> {
    let mut variations = Vec::new();

    if selector.contains('-') {
        variations.push(selector.replace('-', "_"));
    }
    if selector.contains('_') {
        variations.push(selector.replace('_', "-"));
    }

    if let Some(class_variant) = class_attr_variant(selector) {
        variations.push(class_variant);
    }

    let without_pseudo = strip_pseudo_classes(selector);
    if without_pseudo != selector {
        variations.push(without_pseudo);
    }

    if selector.contains(" > ") {
        variations.push(selector.replace(" > ", " "));
    } else if selector.contains(' ') && !selector.contains('>') {
        variations.push(selector.replacen(' ', " > ", 1));
    }

    variations.retain(|v| !v.is_empty() && v != selector);
    variations.dedup();
    variations
}

/// `.some-class` → `[class*="some-class"]`, useful when the live DOM
/// has extra BEM-style modifier classes the selector doesn't expect.
fn class_attr_variant(selector: &str) -> Option<String> {
    let trimmed = selector.trim();
    if let Some(rest) = trimmed.strip_prefix('.') {
        let class_name = rest.split(|c: char| c == ' ' || c == '.').next()?;
        if class_name.is_empty() {
            return None;
        }
        Some(format!("[class*=\"{class_name}\"]"))
    } else {
        None
    }
}

fn strip_pseudo_classes(selector: &str) -> String {
    match selector.find(':') {
        Some(idx) => selector[..idx].to_string(),
        None => selector.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_hyphen_and_underscore() {
        let variations = generate_variations("article-body");
        assert!(variations.contains(&"article_body".to_string()));
    }

    #[test]
    fn produces_class_attribute_variant() {
        let variations = generate_variations(".article-body");
        assert!(variations.iter().any(|v| v.contains("[class*=")));
    }

    #[test]
    fn removes_pseudo_classes() {
        let variations = generate_variations("div:first-child");
        assert!(variations.contains(&"div".to_string()));
    }

    #[test]
    fn flips_descendant_and_direct_child() {
        let variations = generate_variations("article > p");
        assert!(variations.contains(&"article p".to_string()));
    }
}
