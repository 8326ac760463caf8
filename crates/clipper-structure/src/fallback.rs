//! Ordered fallback selector lists, by field (GLOSSARY). Re-exported
//! from `clipper-types` so the Structure Engine and the Extractor
//! share exactly one copy of the glossary's fallback lists.

pub use clipper_types::{AUTHOR_FALLBACKS, CONTENT_FALLBACKS, DATE_FALLBACKS, TITLE_FALLBACKS};
