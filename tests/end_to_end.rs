use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use excerpt_core::config::{ConfigError, ModeKind, RetrievalConfig, RetrievalOptions};
use excerpt_core::generation::{GenerationCapability, GenerationError};
use excerpt_core::retrieval::{RetrievalError, Retriever};
use excerpt_core::sampling::DISCONTINUITY_MARKER;
use excerpt_core::source::{FetchError, IdentityNormalizer, SourceText, TextNormalizer, TextSource};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Serves documents from memory; unknown sources are not found.
#[derive(Default)]
struct MemorySource {
    documents: HashMap<String, SourceText>,
    denied: Vec<String>,
}

impl MemorySource {
    fn with_text(mut self, source: &str, text: impl Into<String>) -> Self {
        self.documents.insert(source.to_string(), SourceText::Text(text.into()));
        self
    }

    fn with_lines(mut self, source: &str, lines: &[&str]) -> Self {
        let lines = lines.iter().map(|l| l.to_string()).collect();
        self.documents.insert(source.to_string(), SourceText::Lines(lines));
        self
    }

    fn denying(mut self, source: &str) -> Self {
        self.denied.push(source.to_string());
        self
    }
}

impl TextSource for MemorySource {
    fn fetch(&self, source: &str) -> Result<SourceText, FetchError> {
        if self.denied.iter().any(|d| d == source) {
            return Err(FetchError::PermissionDenied(source.to_string()));
        }
        self.documents
            .get(source)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(source.to_string()))
    }
}

struct StripTags;

impl TextNormalizer for StripTags {
    fn normalize(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut in_tag = false;
        for c in raw.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                c if !in_tag => out.push(c),
                _ => {}
            }
        }
        out.trim().to_string()
    }
}

struct FailingGenerator {
    calls: AtomicUsize,
}

impl GenerationCapability for FailingGenerator {
    fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::Provider("model unavailable".to_string()))
    }
}

fn long_text(chars: usize) -> String {
    (0..chars).map(|i| char::from(b'a' + (i % 26) as u8)).collect()
}

#[test]
fn scenario_head_short_text_returned_whole() {
    let text = long_text(100);
    let source = MemorySource::default().with_text("page", text.clone());
    let config =
        RetrievalConfig::from_options(RetrievalOptions::new(ModeKind::Head).max_chars(500), None).unwrap();
    let retriever = Retriever::new(config, source);

    let envelope = retriever.run(Some("page"));
    assert_eq!(envelope.content(), Some(text.as_str()));
    assert_eq!(envelope.source(), Some("page"));
    assert_eq!(envelope.mode_used(), ModeKind::Head);
}

#[test]
fn scenario_random_chunks_long_text() {
    let text = long_text(10_000);
    let source = MemorySource::default().with_text("page", text.clone());
    let options = RetrievalOptions::new(ModeKind::RandomChunks)
        .max_chars(3000)
        .default_source("page");
    let retriever = Retriever::new(RetrievalConfig::from_options(options, None).unwrap(), source);

    let mut rng = StdRng::seed_from_u64(99);
    let envelope = retriever.run_with_rng(None, &mut rng);
    let content = envelope.content().unwrap();

    let markers = content.matches(DISCONTINUITY_MARKER).count();
    assert!(content.len() <= 3000 + markers * DISCONTINUITY_MARKER.len());
    assert!(content.starts_with(&text[..1000]));
    assert!(content.ends_with(&text[9000..]));
    assert_eq!(envelope.source(), Some("page"));
}

#[test]
fn scenario_summarize_without_generator_never_builds() {
    let result = Retriever::from_options(
        RetrievalOptions::new(ModeKind::Summarize),
        None,
        MemorySource::default(),
        IdentityNormalizer,
    );
    assert!(matches!(result, Err(ConfigError::MissingGenerator)));
}

#[test]
fn scenario_generation_fails_three_times() {
    let generator = Arc::new(FailingGenerator {
        calls: AtomicUsize::new(0),
    });
    let source = MemorySource::default().with_text("page", "Something worth summarizing.");
    let retriever = Retriever::from_options(
        RetrievalOptions::new(ModeKind::Summarize),
        Some(generator.clone() as Arc<dyn GenerationCapability>),
        source,
        IdentityNormalizer,
    )
    .unwrap();

    let envelope = retriever.run(Some("page"));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    assert_eq!(envelope.content(), None);
    assert_eq!(envelope.mode_used(), ModeKind::Summarize);
    assert_eq!(
        envelope.error(),
        Some("Generation failed after 3 attempts: Provider error: model unavailable")
    );
}

#[test]
fn summarize_success_through_engine() {
    let generator: Arc<dyn GenerationCapability> = Arc::new(|prompt: &str| -> Result<String, GenerationError> {
        assert!(prompt.ends_with("Quarterly numbers went up."));
        Ok("Numbers rose.".to_string())
    });
    let source = MemorySource::default().with_text("report", "<p>Quarterly numbers went up.</p>");
    let retriever = Retriever::from_options(
        RetrievalOptions::new(ModeKind::Summarize).prompt_template("Summarize:\n"),
        Some(generator),
        source,
        StripTags,
    )
    .unwrap();

    let envelope = retriever.run(Some("report"));
    assert_eq!(envelope.content(), Some("Numbers rose."));
}

#[test]
fn invariant_missing_source_reported_in_envelope() {
    let retriever = Retriever::new(RetrievalConfig::full(), MemorySource::default());

    let envelope = retriever.run(None);
    assert_eq!(envelope.error(), Some("A source identifier is required"));
    assert_eq!(envelope.content(), None);
    assert_eq!(envelope.source(), None);
    assert_eq!(
        envelope.to_json().unwrap(),
        r#"{"error":"A source identifier is required","mode_used":"full"}"#
    );
}

#[test]
fn invariant_fetch_errors_reported_in_envelope() {
    let source = MemorySource::default().denying("secret.txt");
    let retriever = Retriever::new(RetrievalConfig::full(), source);

    let missing = retriever.run(Some("nowhere.txt"));
    assert_eq!(missing.error(), Some("Source not found: nowhere.txt"));
    assert_eq!(missing.source(), Some("nowhere.txt"));

    let denied = retriever.run(Some("secret.txt"));
    assert_eq!(denied.error(), Some("Permission denied for source: secret.txt"));
}

#[test]
fn invariant_range_error_reported_in_envelope() {
    let source = MemorySource::default().with_lines("notes.txt", &["one", "two"]);
    let options = RetrievalOptions::new(ModeKind::Full).start_line(5);
    let retriever = Retriever::new(RetrievalConfig::from_options(options, None).unwrap(), source);

    let envelope = retriever.run(Some("notes.txt"));
    assert_eq!(
        envelope.error(),
        Some("Start line 5 exceeds the number of lines (2)")
    );
}

#[test]
fn per_call_source_overrides_default() {
    let source = MemorySource::default()
        .with_lines("a.txt", &["alpha"])
        .with_lines("b.txt", &["beta"]);
    let options = RetrievalOptions::new(ModeKind::Full).default_source("a.txt");
    let retriever = Retriever::new(RetrievalConfig::from_options(options, None).unwrap(), source);

    assert_eq!(retriever.run(None).content(), Some("alpha"));
    assert_eq!(retriever.run(Some("b.txt")).content(), Some("beta"));
}

#[test]
fn full_page_is_normalized() {
    let source = MemorySource::default().with_text("site", "  <h1>Title</h1> body ");
    let retriever = Retriever::with_normalizer(RetrievalConfig::full(), source, StripTags);

    assert_eq!(retriever.run(Some("site")).content(), Some("Title body"));
}

#[test]
fn retrieve_with_propagates_errors() {
    let retriever = Retriever::new(RetrievalConfig::full(), MemorySource::default());
    let err = retriever
        .retrieve_with(Some("gone"), &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert_eq!(err, RetrievalError::Fetch(FetchError::NotFound("gone".to_string())));
}

#[test]
fn load_normalizes_flat_text_only() {
    let source = MemorySource::default()
        .with_text("site", "<b>same</b>")
        .with_lines("notes.txt", &["<b>kept</b>", "as read"]);
    let retriever = Retriever::with_normalizer(RetrievalConfig::full(), source, StripTags);

    assert_eq!(retriever.load("site").unwrap(), SourceText::Text("same".to_string()));
    assert_eq!(
        retriever.load("notes.txt").unwrap(),
        SourceText::Lines(vec!["<b>kept</b>".to_string(), "as read".to_string()])
    );
}

#[test]
fn invariant_empty_source_is_missing() {
    let retriever = Retriever::new(RetrievalConfig::full(), MemorySource::default().with_text("", "hidden"));

    for blank in ["", "   ", "\t\n"] {
        let envelope = retriever.run(Some(blank));
        assert_eq!(envelope.error(), Some("A source identifier is required"));
        assert_eq!(envelope.content(), None);
        assert_eq!(envelope.source(), None);
        assert_eq!(
            envelope.to_json().unwrap(),
            r#"{"error":"A source identifier is required","mode_used":"full"}"#
        );
    }
}

#[test]
fn blank_source_falls_back_to_default() {
    let source = MemorySource::default().with_lines("a.txt", &["alpha"]);
    let options = RetrievalOptions::new(ModeKind::Full).default_source("a.txt");
    let retriever = Retriever::new(RetrievalConfig::from_options(options, None).unwrap(), source);

    let envelope = retriever.run(Some(""));
    assert_eq!(envelope.content(), Some("alpha"));
    assert_eq!(envelope.source(), Some("a.txt"));
}

#[test]
fn blank_default_source_is_missing() {
    let options = RetrievalOptions::new(ModeKind::Full).default_source("  ");
    let retriever = Retriever::new(
        RetrievalConfig::from_options(options, None).unwrap(),
        MemorySource::default(),
    );

    assert_eq!(retriever.run(None).error(), Some("A source identifier is required"));
}

#[test]
fn invariant_blank_page_is_an_error() {
    let source = MemorySource::default()
        .with_text("empty", "")
        .with_text("markup", "  <div><br/></div>  ");
    let retriever = Retriever::with_normalizer(RetrievalConfig::full(), source, StripTags);

    let empty = retriever.run(Some("empty"));
    assert_eq!(empty.content(), None);
    assert_eq!(empty.error(), Some("No text content found in empty after cleaning"));
    assert_eq!(empty.source(), Some("empty"));

    let markup = retriever.run(Some("markup"));
    assert_eq!(markup.content(), None);
    assert_eq!(markup.error(), Some("No text content found in markup after cleaning"));
}

#[test]
fn blank_page_never_reaches_generator() {
    let generator = Arc::new(FailingGenerator {
        calls: AtomicUsize::new(0),
    });
    let source = MemorySource::default().with_text("page", "<p>   </p>");
    let retriever = Retriever::from_options(
        RetrievalOptions::new(ModeKind::Summarize),
        Some(generator.clone() as Arc<dyn GenerationCapability>),
        source,
        StripTags,
    )
    .unwrap();

    let err = retriever
        .retrieve_with(Some("page"), &mut StdRng::seed_from_u64(1))
        .unwrap_err();
    assert_eq!(err, RetrievalError::NoContent("page".to_string()));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn whitespace_line_window_is_content() {
    let source = MemorySource::default().with_lines("notes.txt", &["", "  ", "text"]);
    let options = RetrievalOptions::new(ModeKind::Full).start_line(1).line_count(2);
    let retriever = Retriever::new(RetrievalConfig::from_options(options, None).unwrap(), source);

    // The window is whitespace only; that is content, not an empty result.
    assert_eq!(retriever.run(Some("notes.txt")).content(), Some("\n  "));

    let empty = MemorySource::default().with_lines("void.txt", &[]);
    let retriever = Retriever::new(RetrievalConfig::full(), empty);
    assert_eq!(
        retriever.run(Some("void.txt")).error(),
        Some("No text content found in void.txt after cleaning")
    );
}

#[test]
fn summarize_rejects_short_summaries_through_engine() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let generator: Arc<dyn GenerationCapability> =
        Arc::new(move |_prompt: &str| -> Result<String, GenerationError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("Too short.".to_string())
        });
    let source = MemorySource::default().with_text("page", long_text(5000));
    let retriever = Retriever::from_options(
        RetrievalOptions::new(ModeKind::Summarize).min_summary_chars(100),
        Some(generator),
        source,
        IdentityNormalizer,
    )
    .unwrap();

    let envelope = retriever.run(Some("page"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(envelope.content(), None);
    assert_eq!(
        envelope.error(),
        Some("Generation failed after 3 attempts: response shorter than 100 characters")
    );
}

#[test]
fn engine_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let source = MemorySource::default().with_text("page", long_text(20_000));
    let options = RetrievalOptions::new(ModeKind::RandomChunks).max_chars(4000);
    let retriever = Arc::new(Retriever::new(
        RetrievalConfig::from_options(options, None).unwrap(),
        source,
    ));
    assert_send_sync(&*retriever);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let retriever = Arc::clone(&retriever);
            std::thread::spawn(move || retriever.run(Some("page")))
        })
        .collect();

    for handle in handles {
        let envelope = handle.join().unwrap();
        assert!(envelope.is_success());
    }
}

#[test]
fn description_is_cached_on_engine() {
    let options = RetrievalOptions::new(ModeKind::Head)
        .max_chars(200)
        .name("Doc Reader")
        .description("Reads docs.");
    let retriever = Retriever::new(
        RetrievalConfig::from_options(options, None).unwrap(),
        MemorySource::default(),
    );
    assert_eq!(retriever.name(), "Doc Reader");
    assert_eq!(
        retriever.description(),
        "Reads docs. Default mode: 'head'. Default 'max_chars': 200."
    );
}
