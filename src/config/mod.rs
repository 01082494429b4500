pub mod describe;
pub mod options;
pub mod validation;

use thiserror::Error;

pub use describe::describe;
pub use options::{ModeKind, RetrievalOptions};
pub use validation::{RetrievalConfig, RetrievalMode};

/// Floor applied to `max_chars` in random_chunks and summarize modes.
pub const RANDOM_CHUNKS_MIN_MAX_CHARS: usize = 3000;

/// Excerpt budget for summarize mode when `max_chars` is not supplied.
pub const SUMMARY_INTERNAL_MAX_CHARS: usize = 34000;

/// Upper bound on the length of a returned summary.
pub const SUMMARY_TARGET_CHARS: usize = 6000;

/// Shortest accepted summary when `min_summary_chars` is not supplied.
pub const DEFAULT_MIN_SUMMARY_CHARS: usize = 1;

pub const DEFAULT_NAME: &str = "Content Retrieval Tool";

pub const DEFAULT_DESCRIPTION: &str = "Retrieves text content with various strategies like full read, head \
     truncation, random chunks, or summarization.";

pub const DEFAULT_SUMMARY_PROMPT: &str = "Provide a concise summary of the following text, capturing the main \
     points and key information. The summary should be up to 6000 characters long.\n\nText:\n";

/// Construction-time failures. A config is never produced when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("'max_chars' is required for '{mode}' mode")]
    MissingMaxChars { mode: ModeKind },

    #[error("'max_chars' must be a positive integer for '{mode}' mode")]
    InvalidMaxChars { mode: ModeKind },

    #[error("A generation capability is required for 'summarize' mode")]
    MissingGenerator,

    #[error("'start_line' must be at least 1, got {0}")]
    InvalidStartLine(usize),

    #[error("'line_count' must be at least 1, got {0}")]
    InvalidLineCount(usize),

    #[error("Invalid options: {0}")]
    Parse(String),
}
