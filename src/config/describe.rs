use super::{ModeKind, RetrievalConfig};

/// Render the caller-facing description of a configured engine.
///
/// The base description is followed by one sentence per configured default,
/// in a fixed order: source, mode, budget, generator.
pub fn describe(config: &RetrievalConfig) -> String {
    let mut details = Vec::new();

    if let Some(source) = config.default_source() {
        details.push(format!("Default source: '{source}'."));
    }

    let kind = config.mode_kind();
    details.push(format!("Default mode: '{kind}'."));

    match kind {
        ModeKind::Head | ModeKind::RandomChunks => {
            if let Some(max_chars) = config.mode().max_chars() {
                details.push(format!("Default 'max_chars': {max_chars}."));
            }
        }
        ModeKind::Summarize => {
            details.push("Configured for summarization with a default LLM.".to_string());
        }
        ModeKind::Full => {}
    }

    format!("{} {}", config.base_description(), details.join(" "))
}
