use std::borrow::Cow;

use rand::Rng;
use tracing::debug;

use crate::config::{RetrievalConfig, RetrievalMode};
use crate::sampling::{head, RandomChunkSampler};
use crate::source::SourceText;
use crate::summarize::Summarizer;

use super::RetrievalError;

/// Route a normalized document to the configured strategy.
pub fn dispatch(body: &SourceText, config: &RetrievalConfig) -> Result<String, RetrievalError> {
    dispatch_with(body, config, &mut rand::thread_rng())
}

pub fn dispatch_with<R: Rng + ?Sized>(
    body: &SourceText,
    config: &RetrievalConfig,
    rng: &mut R,
) -> Result<String, RetrievalError> {
    debug!(mode = %config.mode_kind(), line_oriented = body.is_line_oriented(), "dispatching");

    match config.mode() {
        RetrievalMode::Full {
            start_line,
            line_count,
        } => match body {
            SourceText::Text(text) => Ok(text.clone()),
            SourceText::Lines(lines) => line_window(lines, *start_line, *line_count),
        },
        RetrievalMode::Head { max_chars } => Ok(head(&flatten(body), *max_chars).to_string()),
        RetrievalMode::RandomChunks { max_chars } => {
            Ok(RandomChunkSampler::default().sample_with(&flatten(body), *max_chars, rng))
        }
        RetrievalMode::Summarize {
            max_chars,
            prompt_template,
            min_summary_chars,
            generator,
        } => {
            let summarizer = Summarizer::new(&**generator, prompt_template, *max_chars)
                .min_summary_chars(*min_summary_chars);
            Ok(summarizer.summarize_with(&flatten(body), rng)?)
        }
    }
}

/// Lines `[start_line, start_line + line_count)`, 1-indexed, joined with `\n`.
///
/// Fails when `start_line` lies past the last line. An empty source read from
/// line 1 yields an empty string.
pub fn line_window(
    lines: &[String],
    start_line: usize,
    line_count: Option<usize>,
) -> Result<String, RetrievalError> {
    if start_line <= 1 && line_count.is_none() {
        return Ok(lines.join("\n"));
    }

    let start = start_line.saturating_sub(1);
    if start >= lines.len() {
        if lines.is_empty() && start == 0 {
            return Ok(String::new());
        }
        return Err(RetrievalError::Range {
            start_line,
            available: lines.len(),
        });
    }

    let end = match line_count {
        Some(count) => start.saturating_add(count).min(lines.len()),
        None => lines.len(),
    };
    Ok(lines[start..end].join("\n"))
}

fn flatten(body: &SourceText) -> Cow<'_, str> {
    match body {
        SourceText::Text(text) => Cow::Borrowed(text.as_str()),
        SourceText::Lines(lines) => Cow::Owned(lines.join("\n")),
    }
}
