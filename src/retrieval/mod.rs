pub mod dispatch;

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, RetrievalConfig, RetrievalOptions};
use crate::generation::GenerationCapability;
use crate::source::{FetchError, IdentityNormalizer, SourceText, TextNormalizer, TextSource};
use crate::summarize::ProcessingError;
use crate::types::ResultEnvelope;

pub use dispatch::{dispatch, dispatch_with, line_window};

/// Call-time failures. Never raised from [`Retriever::run`]; they end up in
/// [`ResultEnvelope::error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("A source identifier is required")]
    MissingSource,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Start line {start_line} exceeds the number of lines ({available})")]
    Range { start_line: usize, available: usize },

    #[error("No text content found in {0} after cleaning")]
    NoContent(String),

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

/// The retrieval engine: a frozen config plus the collaborators that supply
/// and clean text.
///
/// Holds no mutable state, so one instance can serve concurrent callers when
/// the collaborators allow it.
#[derive(Debug)]
pub struct Retriever<S, N = IdentityNormalizer> {
    config: RetrievalConfig,
    source: S,
    normalizer: N,
}

impl<S: TextSource> Retriever<S, IdentityNormalizer> {
    pub fn new(config: RetrievalConfig, source: S) -> Self {
        Self::with_normalizer(config, source, IdentityNormalizer)
    }
}

impl<S, N> Retriever<S, N>
where
    S: TextSource,
    N: TextNormalizer,
{
    pub fn with_normalizer(config: RetrievalConfig, source: S, normalizer: N) -> Self {
        Self {
            config,
            source,
            normalizer,
        }
    }

    /// Validate `options` and build an engine in one step.
    pub fn from_options(
        options: RetrievalOptions,
        generator: Option<Arc<dyn GenerationCapability>>,
        source: S,
        normalizer: N,
    ) -> Result<Self, ConfigError> {
        let config = RetrievalConfig::from_options(options, generator)?;
        Ok(Self::with_normalizer(config, source, normalizer))
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn description(&self) -> &str {
        self.config.description()
    }

    /// Fetch and normalize a document.
    pub fn load(&self, source: &str) -> Result<SourceText, RetrievalError> {
        let body = self.source.fetch(source)?.normalized(&self.normalizer);
        debug!(source, line_oriented = body.is_line_oriented(), "loaded document");
        Ok(body)
    }

    /// Retrieve from `source`, or the configured default, and propagate any
    /// failure.
    ///
    /// Blank identifiers count as missing. A document that is blank after
    /// normalization, or a strategy that yields nothing, fails with
    /// [`RetrievalError::NoContent`].
    pub fn retrieve_with<R: Rng + ?Sized>(
        &self,
        source: Option<&str>,
        rng: &mut R,
    ) -> Result<String, RetrievalError> {
        let source = self.effective_source(source).ok_or(RetrievalError::MissingSource)?;
        let body = self.load(source)?;
        if body.is_blank() {
            return Err(RetrievalError::NoContent(source.to_string()));
        }

        let content = dispatch_with(&body, &self.config, rng)?;
        if content.is_empty() {
            return Err(RetrievalError::NoContent(source.to_string()));
        }
        Ok(content)
    }

    pub fn run(&self, source: Option<&str>) -> ResultEnvelope {
        self.run_with_rng(source, &mut rand::thread_rng())
    }

    /// Like [`Retriever::run`], drawing sampling randomness from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, source: Option<&str>, rng: &mut R) -> ResultEnvelope {
        let mode = self.config.mode_kind();
        let effective = self.effective_source(source).map(str::to_string);

        let outcome = self.retrieve_with(source, rng);
        match &outcome {
            Ok(content) => info!(
                %mode,
                source = effective.as_deref().unwrap_or(""),
                chars = content.chars().count(),
                "retrieval succeeded"
            ),
            Err(e) => info!(
                %mode,
                source = effective.as_deref().unwrap_or(""),
                error = %e,
                "retrieval failed"
            ),
        }

        ResultEnvelope::build(outcome, effective, mode)
    }

    fn effective_source<'a>(&'a self, source: Option<&'a str>) -> Option<&'a str> {
        let present = |s: &&str| !s.trim().is_empty();
        source
            .filter(present)
            .or_else(|| self.config.default_source().filter(present))
    }
}
