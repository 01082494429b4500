use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ModeKind;

/// The outcome of one retrieval call.
///
/// Exactly one of `content` or `error` is set. The constructors are the only
/// way to build an envelope, and deserialization goes through the same check.
/// An empty `source` is dropped so it never serializes as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EnvelopeRepr")]
pub struct ResultEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    mode_used: ModeKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("envelope has both content and error")]
    Both,
    #[error("envelope has neither content nor error")]
    Neither,
}

#[derive(Deserialize)]
struct EnvelopeRepr {
    content: Option<String>,
    error: Option<String>,
    source: Option<String>,
    mode_used: ModeKind,
}

impl TryFrom<EnvelopeRepr> for ResultEnvelope {
    type Error = EnvelopeError;

    fn try_from(repr: EnvelopeRepr) -> Result<Self, Self::Error> {
        match (repr.content, repr.error) {
            (Some(_), Some(_)) => Err(EnvelopeError::Both),
            (None, None) => Err(EnvelopeError::Neither),
            (content, error) => Ok(ResultEnvelope {
                content,
                error,
                source: repr.source,
                mode_used: repr.mode_used,
            }),
        }
    }
}

impl ResultEnvelope {
    pub fn success(content: impl Into<String>, source: Option<String>, mode_used: ModeKind) -> Self {
        Self {
            content: Some(content.into()),
            error: None,
            source: source.filter(|s| !s.is_empty()),
            mode_used,
        }
    }

    pub fn failure(reason: impl fmt::Display, source: Option<String>, mode_used: ModeKind) -> Self {
        Self {
            content: None,
            error: Some(reason.to_string()),
            source: source.filter(|s| !s.is_empty()),
            mode_used,
        }
    }

    /// Wrap a finished call. Errors are rendered with `Display`.
    pub fn build<E: fmt::Display>(
        outcome: Result<String, E>,
        source: Option<String>,
        mode_used: ModeKind,
    ) -> Self {
        match outcome {
            Ok(content) => Self::success(content, source, mode_used),
            Err(reason) => Self::failure(reason, source, mode_used),
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn mode_used(&self) -> ModeKind {
        self.mode_used
    }

    pub fn is_success(&self) -> bool {
        self.content.is_some()
    }

    /// Content on success, error text on failure.
    pub fn into_result(self) -> Result<String, String> {
        match (self.content, self.error) {
            (Some(content), _) => Ok(content),
            (None, Some(error)) => Err(error),
            (None, None) => unreachable!("envelope invariant: content or error is set"),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
