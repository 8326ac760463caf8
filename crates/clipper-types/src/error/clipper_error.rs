//! Error taxonomy for the ingestion engine.
//!
//! Every component routes its failures through [`ClipperError`] so the
//! error log (`ErrorLogRecord`) always has a stable `kind` to key off of.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ClipperError`].
pub type Result<T> = std::result::Result<T, ClipperError>;

/// The error taxonomy from the error-handling design: every surfaced
/// failure belongs to exactly one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Network,
    Timeout,
    Headless,
    Parsing,
    Ai,
    Auth,
    Unknown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Headless => "headless",
            ErrorKind::Parsing => "parsing",
            ErrorKind::Ai => "ai",
            ErrorKind::Auth => "auth",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Main error type for the ingestion engine.
#[derive(Error, Debug)]
pub enum ClipperError {
    #[error("network error: {0}")]
    Network(String),

    #[error("operation timed out after {0}ms")]
    Timeout(u64),

    #[error("headless browser error: {0}")]
    Headless(String),

    #[error("parsing error: {0}")]
    Parsing(String),

    #[error("AI/LLM error: {0}")]
    Ai(String),

    #[error("authentication/challenge error: {0}")]
    Auth(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("browser manager is shutting down")]
    ShuttingDown,

    #[error("too many consecutive scheduler failures")]
    CircuitBreakerTripped,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ClipperError {
    /// The taxonomy kind this error belongs to, for the error log.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClipperError::Network(_) => ErrorKind::Network,
            ClipperError::Timeout(_) => ErrorKind::Timeout,
            ClipperError::Headless(_) => ErrorKind::Headless,
            ClipperError::Parsing(_) => ErrorKind::Parsing,
            ClipperError::Ai(_) => ErrorKind::Ai,
            ClipperError::Auth(_) => ErrorKind::Auth,
            ClipperError::InvalidUrl(_) => ErrorKind::Parsing,
            ClipperError::Json(_) => ErrorKind::Ai,
            ClipperError::ShuttingDown | ClipperError::CircuitBreakerTripped => ErrorKind::Unknown,
            ClipperError::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Whether the caller should absorb this error locally (log and
    /// advance) rather than propagate it. Only shutdown and the
    /// scheduler breaker are fatal (§7 propagation policy).
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ClipperError::ShuttingDown | ClipperError::CircuitBreakerTripped
        )
    }
}
