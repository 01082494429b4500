use std::fmt;

use thiserror::Error;

/// Errors raised by a text-generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The provider rejected or failed the request.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The request never reached the provider or the reply was lost.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider did not answer in time.
    #[error("Generation timed out")]
    Timeout,
}

/// A synchronous text-completion capability.
///
/// Implemented outside this crate by LLM provider adapters. Credentials,
/// transport and timeouts are the implementor's concern; the engine only
/// blocks on `complete` and inspects the result.
pub trait GenerationCapability: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Short label used in logs and descriptions.
    fn label(&self) -> &str {
        "llm"
    }
}

impl fmt::Debug for dyn GenerationCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationCapability")
            .field("label", &self.label())
            .finish()
    }
}

impl<F> GenerationCapability for F
where
    F: Fn(&str) -> Result<String, GenerationError> + Send + Sync,
{
    fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self(prompt)
    }
}
