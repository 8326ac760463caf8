//! Link Discovery (§4.4): finds candidate article links on a source
//! page, normalises and filters them, and optionally narrows them
//! further with an LLM.

pub mod ai_filter;
pub mod candidates;
pub mod discover;
pub mod filters;
pub mod normalize;

pub use discover::LinkDiscovery;
