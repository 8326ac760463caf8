//! Shared data model, error taxonomy, and repository boundaries for
//! the ingestion engine. Every other crate in the workspace depends on
//! this one and nothing else at the type level.

pub mod error;
pub mod fallback;
pub mod fetch_options;
pub mod model;
pub mod repository;
pub mod text_patterns;

pub use error::{ClipperError, ErrorKind, Result};
pub use fallback::{AUTHOR_FALLBACKS, CONTENT_FALLBACKS, DATE_FALLBACKS, TITLE_FALLBACKS};
pub use fetch_options::{AiLinkContext, FetchIntent, FetchOptions, ForceMethod};
pub use model::{
    Article, ArticleContent, ArticleFlags, ErrorLogRecord, ExtractionMethod, FetchMethod,
    FetchOutcome, ProtectionKind, ProtectionSignal, SelectorConfig, Source,
};
pub use repository::{ArticleRepository, ErrorLog, SourceRepository};
