//! Bounded content retrieval engine for AI agents and LLMs.
//!
//! `excerpt-core` takes an arbitrarily long text document, supplied by an
//! external [`source::TextSource`], and returns a bounded, representative
//! slice of it using one of four strategies: full extraction, head
//! truncation, random-chunk sampling, or summarization through a
//! [`generation::GenerationCapability`].
//!
//! Configuration is validated exactly once, when a
//! [`config::RetrievalConfig`] is built. Every call produces a
//! [`types::ResultEnvelope`] holding either content or an error, never both.

pub mod config;
pub mod generation;
pub mod retrieval;
pub mod sampling;
pub mod source;
pub mod summarize;
pub mod types;

pub use config::{ConfigError, ModeKind, RetrievalConfig, RetrievalMode, RetrievalOptions};
pub use retrieval::{RetrievalError, Retriever};
pub use types::ResultEnvelope;
