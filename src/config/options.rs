use std::fmt;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// The four retrieval strategies, without their parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    #[default]
    Full,
    Head,
    RandomChunks,
    Summarize,
}

impl ModeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Full => "full",
            ModeKind::Head => "head",
            ModeKind::RandomChunks => "random_chunks",
            ModeKind::Summarize => "summarize",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw construction arguments, before validation.
///
/// `mode` is required, also when loading from TOML. Every other field is
/// optional; which ones are needed depends on the mode and is checked by
/// [`super::RetrievalConfig::from_options`].
/// The generation capability is not part of this struct because it cannot be
/// serialized; it is passed next to the options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalOptions {
    pub mode: ModeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_summary_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RetrievalOptions {
    pub fn new(mode: ModeKind) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn start_line(mut self, start_line: usize) -> Self {
        self.start_line = Some(start_line);
        self
    }

    pub fn line_count(mut self, line_count: usize) -> Self {
        self.line_count = Some(line_count);
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    /// Shortest trimmed summary accepted from the generator.
    pub fn min_summary_chars(mut self, chars: usize) -> Self {
        self.min_summary_chars = Some(chars);
        self
    }

    pub fn default_source(mut self, source: impl Into<String>) -> Self {
        self.default_source = Some(source.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Load options from a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize options to a TOML document.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
