use std::sync::Arc;

use crate::generation::GenerationCapability;

use super::options::{ModeKind, RetrievalOptions};
use super::{
    describe, ConfigError, DEFAULT_DESCRIPTION, DEFAULT_MIN_SUMMARY_CHARS, DEFAULT_NAME,
    DEFAULT_SUMMARY_PROMPT, RANDOM_CHUNKS_MIN_MAX_CHARS, SUMMARY_INTERNAL_MAX_CHARS,
};

/// A validated retrieval strategy. Each variant carries only what it needs.
#[derive(Debug, Clone)]
pub enum RetrievalMode {
    /// Whole document, or a line window of a line-oriented source.
    Full {
        start_line: usize,
        line_count: Option<usize>,
    },
    /// First `max_chars` characters.
    Head { max_chars: usize },
    /// Anchored random blocks totalling at most `max_chars` characters.
    RandomChunks { max_chars: usize },
    /// Summary of a `max_chars` excerpt produced by `generator`.
    Summarize {
        max_chars: usize,
        prompt_template: String,
        /// Trimmed responses shorter than this are failed attempts.
        min_summary_chars: usize,
        generator: Arc<dyn GenerationCapability>,
    },
}

impl RetrievalMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            RetrievalMode::Full { .. } => ModeKind::Full,
            RetrievalMode::Head { .. } => ModeKind::Head,
            RetrievalMode::RandomChunks { .. } => ModeKind::RandomChunks,
            RetrievalMode::Summarize { .. } => ModeKind::Summarize,
        }
    }

    /// The effective character budget, if the mode has one.
    pub fn max_chars(&self) -> Option<usize> {
        match self {
            RetrievalMode::Full { .. } => None,
            RetrievalMode::Head { max_chars }
            | RetrievalMode::RandomChunks { max_chars }
            | RetrievalMode::Summarize { max_chars, .. } => Some(*max_chars),
        }
    }
}

/// Frozen engine configuration.
///
/// The only way to obtain one is [`RetrievalConfig::from_options`], which
/// enforces every mode-specific requirement. Fields are private and there are
/// no setters, so a config that exists is valid for its whole lifetime.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    mode: RetrievalMode,
    default_source: Option<String>,
    name: String,
    base_description: String,
    description: String,
}

impl RetrievalConfig {
    /// Validate raw options into a frozen config.
    ///
    /// `generator` is required for summarize mode and ignored otherwise.
    pub fn from_options(
        options: RetrievalOptions,
        generator: Option<Arc<dyn GenerationCapability>>,
    ) -> Result<Self, ConfigError> {
        let mode = validate_mode(&options, generator)?;

        Ok(RetrievalConfig::frozen(
            mode,
            options.default_source,
            options.name,
            options.description,
        ))
    }

    /// Full mode over the whole document. Cannot fail.
    pub fn full() -> Self {
        RetrievalConfig::frozen(
            RetrievalMode::Full {
                start_line: 1,
                line_count: None,
            },
            None,
            None,
            None,
        )
    }

    fn frozen(
        mode: RetrievalMode,
        default_source: Option<String>,
        name: Option<String>,
        description: Option<String>,
    ) -> Self {
        let mut config = RetrievalConfig {
            mode,
            default_source,
            name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            base_description: description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            description: String::new(),
        };
        config.description = describe(&config);
        config
    }

    pub fn mode(&self) -> &RetrievalMode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn default_source(&self) -> Option<&str> {
        self.default_source.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description without the configuration suffix.
    pub fn base_description(&self) -> &str {
        &self.base_description
    }

    /// Human-readable description, computed once at construction.
    pub fn description(&self) -> &str {
        &self.description
    }
}

fn validate_mode(
    options: &RetrievalOptions,
    generator: Option<Arc<dyn GenerationCapability>>,
) -> Result<RetrievalMode, ConfigError> {
    let mode = options.mode;

    if options.max_chars == Some(0) && mode != ModeKind::Full {
        return Err(ConfigError::InvalidMaxChars { mode });
    }

    match mode {
        ModeKind::Full => {
            let start_line = options.start_line.unwrap_or(1);
            if start_line == 0 {
                return Err(ConfigError::InvalidStartLine(start_line));
            }
            if options.line_count == Some(0) {
                return Err(ConfigError::InvalidLineCount(0));
            }
            Ok(RetrievalMode::Full {
                start_line,
                line_count: options.line_count,
            })
        }
        ModeKind::Head => {
            let max_chars = options
                .max_chars
                .ok_or(ConfigError::MissingMaxChars { mode })?;
            Ok(RetrievalMode::Head { max_chars })
        }
        ModeKind::RandomChunks => {
            let max_chars = options
                .max_chars
                .ok_or(ConfigError::MissingMaxChars { mode })?;
            Ok(RetrievalMode::RandomChunks {
                max_chars: max_chars.max(RANDOM_CHUNKS_MIN_MAX_CHARS),
            })
        }
        ModeKind::Summarize => {
            let generator = generator.ok_or(ConfigError::MissingGenerator)?;
            let max_chars = options
                .max_chars
                .unwrap_or(SUMMARY_INTERNAL_MAX_CHARS)
                .max(RANDOM_CHUNKS_MIN_MAX_CHARS);
            let prompt_template = options
                .prompt_template
                .clone()
                .unwrap_or_else(|| DEFAULT_SUMMARY_PROMPT.to_string());
            let min_summary_chars = options
                .min_summary_chars
                .unwrap_or(DEFAULT_MIN_SUMMARY_CHARS)
                .max(DEFAULT_MIN_SUMMARY_CHARS);
            Ok(RetrievalMode::Summarize {
                max_chars,
                prompt_template,
                min_summary_chars,
                generator,
            })
        }
    }
}
