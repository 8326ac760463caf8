//! Ordered fallback selector lists, by field (GLOSSARY). Shared by the
//! Structure Engine (cache-miss recovery) and the Extractor (per-field
//! recovery), so both sides of the selector contract agree on them.

pub const TITLE_FALLBACKS: &[&str] = &[
    "h1",
    ".article-title",
    ".post-title",
    ".headline",
    ".title",
    "h1.title",
    "h1.headline",
    ".entry-title",
];

pub const CONTENT_FALLBACKS: &[&str] = &[
    "article",
    ".article-content",
    ".article-body",
    "main .content",
    ".post-content",
    "#article-content",
    ".story-content",
    ".entry-content",
    "main",
    ".main-content",
    "#main-content",
];

pub const AUTHOR_FALLBACKS: &[&str] = &[
    ".author",
    ".byline",
    ".article-author",
    ".post-author",
    ".writer",
    ".by-author",
    "[rel=author]",
];

pub const DATE_FALLBACKS: &[&str] = &[
    "time",
    "[datetime]",
    ".article-date",
    ".post-date",
    ".published-date",
    ".timestamp",
    ".date",
    ".publish-date",
    ".created-date",
];
