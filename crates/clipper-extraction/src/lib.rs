//! The content Extractor (§4.3): applies selectors with a
//! variation/fallback recovery ladder, escalates to AI re-analysis,
//! and degrades through multi-attempt recovery before giving up.

pub mod ai;
pub mod date;
pub mod extractor;
pub mod fields;
pub mod quality;
pub mod recovery;
pub mod variations;

pub use extractor::Extractor;
