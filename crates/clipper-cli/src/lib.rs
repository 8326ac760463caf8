//! Operator entry point for the ingestion engine: a thin binary that
//! wires `ClipperConfig`, an HTTP-backed `LlmProvider`, and a
//! flat-file repository into the `clipper` crate's `build_scheduler`,
//! then exposes `run`/`once`/`status`/`sources` operator commands.

pub mod llm;
pub mod store;
