//! The Structure Engine (§4.2): per-domain selector detection, cached
//! and validated against the live page.

pub mod cache;
pub mod engine;
pub mod fallback;
pub mod preprocess;
pub mod sanitize;
pub mod validate;

pub use cache::SelectorCache;
pub use engine::StructureEngine;
