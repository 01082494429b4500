use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{DEFAULT_MIN_SUMMARY_CHARS, SUMMARY_TARGET_CHARS};
use crate::generation::GenerationCapability;
use crate::sampling::{head, RandomChunkSampler};

/// Total generation attempts per summary, first try included.
pub const GENERATION_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("No content extracted to summarize")]
    EmptyExcerpt,

    #[error("Generation failed after {attempts} attempts: {reason}")]
    Exhausted { attempts: usize, reason: String },
}

/// Summarizes a document through a generation capability.
///
/// The prompt is the template followed by a sampled excerpt of at most
/// `excerpt_chars` characters (plus markers). Attempts that error or return
/// a response shorter than `min_summary_chars` after trimming are retried
/// immediately, up to [`GENERATION_ATTEMPTS`] in total.
pub struct Summarizer<'a> {
    generator: &'a dyn GenerationCapability,
    prompt_template: &'a str,
    excerpt_chars: usize,
    sampler: RandomChunkSampler,
    min_summary_chars: usize,
    target_chars: usize,
}

impl<'a> Summarizer<'a> {
    pub fn new(
        generator: &'a dyn GenerationCapability,
        prompt_template: &'a str,
        excerpt_chars: usize,
    ) -> Self {
        Self {
            generator,
            prompt_template,
            excerpt_chars,
            sampler: RandomChunkSampler::default(),
            min_summary_chars: DEFAULT_MIN_SUMMARY_CHARS,
            target_chars: SUMMARY_TARGET_CHARS,
        }
    }

    /// Reject responses shorter than `chars` characters. Values below one
    /// still reject blank responses.
    pub fn min_summary_chars(mut self, chars: usize) -> Self {
        self.min_summary_chars = chars.max(DEFAULT_MIN_SUMMARY_CHARS);
        self
    }

    /// Truncate accepted summaries to `chars` characters.
    pub fn target_chars(mut self, chars: usize) -> Self {
        self.target_chars = chars;
        self
    }

    pub fn sampler(mut self, sampler: RandomChunkSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// The exact prompt sent for `excerpt`.
    pub fn prompt_for(&self, excerpt: &str) -> String {
        let mut prompt = String::with_capacity(self.prompt_template.len() + excerpt.len());
        prompt.push_str(self.prompt_template);
        prompt.push_str(excerpt);
        prompt
    }

    pub fn summarize(&self, text: &str) -> Result<String, ProcessingError> {
        self.summarize_with(text, &mut rand::thread_rng())
    }

    pub fn summarize_with<R: Rng + ?Sized>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> Result<String, ProcessingError> {
        let excerpt = self.sampler.sample_with(text, self.excerpt_chars, rng);
        if excerpt.trim().is_empty() {
            return Err(ProcessingError::EmptyExcerpt);
        }

        let prompt = self.prompt_for(&excerpt);
        debug!(
            generator = self.generator.label(),
            excerpt_chars = excerpt.chars().count(),
            prompt_bytes = prompt.len(),
            "requesting summary"
        );

        let mut last_failure = String::new();
        for attempt in 1..=GENERATION_ATTEMPTS {
            match self.generator.complete(&prompt) {
                Ok(raw) => {
                    let summary = raw.trim();
                    if summary.chars().count() >= self.min_summary_chars {
                        debug!(attempt, "summary accepted");
                        return Ok(head(summary, self.target_chars).to_string());
                    }
                    last_failure = if summary.is_empty() {
                        "blank response".to_string()
                    } else {
                        format!("response shorter than {} characters", self.min_summary_chars)
                    };
                    warn!(attempt, reason = %last_failure, "generation returned no usable summary");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "generation attempt failed");
                    last_failure = e.to_string();
                }
            }
        }

        Err(ProcessingError::Exhausted {
            attempts: GENERATION_ATTEMPTS,
            reason: last_failure,
        })
    }
}
