use thiserror::Error;

/// Failures reported by a [`TextSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Permission denied for source: {0}")]
    PermissionDenied(String),

    #[error("Error reading {location}: {reason}")]
    Io { location: String, reason: String },

    #[error("Error fetching {location}: {reason}")]
    Network { location: String, reason: String },
}

/// Raw text as delivered by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceText {
    /// A flat document, such as the text of a fetched page.
    Text(String),
    /// A line-oriented document, such as a file. Lines carry no terminators.
    Lines(Vec<String>),
}

impl SourceText {
    pub fn is_line_oriented(&self) -> bool {
        matches!(self, SourceText::Lines(_))
    }

    /// The document as one string; lines are joined with `\n`.
    pub fn joined(&self) -> String {
        match self {
            SourceText::Text(text) => text.clone(),
            SourceText::Lines(lines) => lines.join("\n"),
        }
    }

    /// Run flat text through `normalizer`. Lines are kept as read.
    pub fn normalized<N: TextNormalizer + ?Sized>(self, normalizer: &N) -> SourceText {
        match self {
            SourceText::Text(text) => SourceText::Text(normalizer.normalize(&text)),
            lines @ SourceText::Lines(_) => lines,
        }
    }

    /// True when there is nothing but whitespace to retrieve.
    pub fn is_blank(&self) -> bool {
        match self {
            SourceText::Text(text) => text.trim().is_empty(),
            SourceText::Lines(lines) => lines.iter().all(|line| line.trim().is_empty()),
        }
    }
}

/// Fetches raw text for a source identifier (URL, path, ...).
///
/// Network and filesystem access live behind this trait; the engine never
/// touches either directly.
pub trait TextSource {
    fn fetch(&self, source: &str) -> Result<SourceText, FetchError>;
}

/// Cleans raw flat text (markup stripping, whitespace collapsing).
///
/// Only applied to [`SourceText::Text`]; line-oriented sources are used as
/// read.
pub trait TextNormalizer {
    fn normalize(&self, raw: &str) -> String;
}

/// Passes text through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl TextNormalizer for IdentityNormalizer {
    fn normalize(&self, raw: &str) -> String {
        raw.to_string()
    }
}

impl<T: TextSource + ?Sized> TextSource for &T {
    fn fetch(&self, source: &str) -> Result<SourceText, FetchError> {
        (**self).fetch(source)
    }
}

impl<N: TextNormalizer + ?Sized> TextNormalizer for &N {
    fn normalize(&self, raw: &str) -> String {
        (**self).normalize(raw)
    }
}
