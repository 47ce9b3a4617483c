use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::builder::{BuildOptions, IndexBuilder, RebuildStats};
use crate::corpus::Corpus;
use crate::destination::Suggestion;
use crate::error::AutolinkError;
use crate::index::DestinationIndex;
use crate::resolver::SuggestionResolver;
use crate::scanner::{Span, TextScanner};
use crate::settings::Settings;
use crate::status::{RebuildObserver, RebuildStatus, TracingObserver};
use crate::terms::Normalizer;

/// Result of a call to [`LinkEngine::rebuild_index`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    Completed(RebuildStats),
    /// Another rebuild was already running; this request was dropped.
    Skipped,
}

/// Owns the current index and answers queries against it.
///
/// Readers take a snapshot of the index and never block on a rebuild; a rebuild swaps in
/// the finished index with a single pointer assignment.
pub struct LinkEngine {
    index: RwLock<Arc<DestinationIndex>>,
    settings: RwLock<Settings>,
    rebuilding: AtomicBool,
    observer: Arc<dyn RebuildObserver>,
}

impl LinkEngine {
    pub fn new(settings: Settings) -> Self {
        Self::with_observer(settings, Arc::new(TracingObserver))
    }

    pub fn with_observer(settings: Settings, observer: Arc<dyn RebuildObserver>) -> Self {
        let normalizer = Normalizer::new(settings.lemmatize_terms);
        Self {
            index: RwLock::new(Arc::new(DestinationIndex::empty(normalizer))),
            settings: RwLock::new(settings),
            rebuilding: AtomicBool::new(false),
            observer,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Replaces the settings and reports whether the index must be rebuilt to honor them.
    pub fn set_settings(&self, settings: Settings) -> bool {
        let mut current = self.settings.write();
        let stale = BuildOptions::from(&*current) != BuildOptions::from(&settings);
        *current = settings;
        stale
    }

    /// The index queries currently run against.
    pub fn snapshot(&self) -> Arc<DestinationIndex> {
        self.index.read().clone()
    }

    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding.load(Ordering::Acquire)
    }

    /// Rebuilds the index from `corpus` and publishes it.
    ///
    /// A request made while another rebuild is running returns
    /// [`RebuildOutcome::Skipped`]. On failure the previous index stays in place.
    pub fn rebuild_index(&self, corpus: &dyn Corpus) -> Result<RebuildOutcome, AutolinkError> {
        let Some(_guard) = RebuildGuard::acquire(&self.rebuilding) else {
            tracing::debug!("rebuild already in progress; skipping request");
            return Ok(RebuildOutcome::Skipped);
        };

        let options = BuildOptions::from(&*self.settings.read());
        tracing::debug!(
            search_file_content = options.search_file_content,
            stem = options.stem,
            "rebuilding link index"
        );

        match IndexBuilder::new(options).build(corpus, self.observer.as_ref()) {
            Ok((index, stats)) => {
                *self.index.write() = Arc::new(index);
                self.observer.report(&RebuildStatus::Updated {
                    elapsed: stats.elapsed,
                });
                tracing::info!(
                    documents = stats.documents,
                    skipped = stats.skipped,
                    destinations = stats.destinations,
                    max_num_terms = stats.max_num_terms,
                    elapsed_ms = stats.elapsed.as_millis() as u64,
                    "link index rebuilt"
                );
                Ok(RebuildOutcome::Completed(stats))
            }
            Err(err) => {
                self.observer.report_error(&err);
                tracing::error!(error = %err, "failed to rebuild link index");
                Err(err)
            }
        }
    }

    /// Every suggestion for the end of `query`, longest match first.
    pub fn suggestions<A: Clone>(&self, query: &str, anchor: A) -> Vec<Suggestion<A>> {
        let index = self.snapshot();
        SuggestionResolver::new(&index).resolve(query, anchor)
    }

    /// Suggestions to offer while typing, empty unless suggestions are enabled.
    ///
    /// Pickers list shorter matches too; the tie-break only decides which entry leads.
    pub fn autocomplete<A: Clone>(&self, query: &str, anchor: A) -> Vec<Suggestion<A>> {
        let settings = self.settings.read().clone();
        if !settings.use_suggestions {
            return Vec::new();
        }
        settings.tie_break.rank(self.suggestions(query, anchor))
    }

    /// The one suggestion a single-choice consumer should act on.
    pub fn best_suggestion<A: Clone>(&self, query: &str, anchor: A) -> Option<Suggestion<A>> {
        let tie_break = self.settings.read().tie_break;
        tie_break.choose(self.suggestions(query, anchor))
    }

    pub fn scan_text(&self, text: &str) -> Vec<Span> {
        let index = self.snapshot();
        let tie_break = self.settings.read().tie_break;
        TextScanner::new(&index, tie_break).scan(text)
    }

    /// Spans to highlight in visible text, empty unless real-time linking is enabled.
    pub fn visible_spans(&self, text: &str) -> Vec<Span> {
        if !self.settings.read().real_time_linking {
            return Vec::new();
        }
        self.scan_text(text)
    }
}

impl std::fmt::Debug for LinkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkEngine")
            .field("destinations", &self.index.read().len())
            .field("rebuilding", &self.is_rebuilding())
            .field("settings", &*self.settings.read())
            .finish()
    }
}

/// Holds the rebuild flag for the lifetime of one rebuild.
struct RebuildGuard<'a>(&'a AtomicBool);

impl<'a> RebuildGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusDocument, InMemoryCorpus};
    use crate::resolver::TieBreak;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        lines: Mutex<Vec<String>>,
    }

    impl RebuildObserver for RecordingObserver {
        fn report(&self, status: &RebuildStatus) {
            self.lines.lock().push(status.to_string());
        }
    }

    struct BrokenCorpus;

    impl Corpus for BrokenCorpus {
        fn documents(&self) -> Result<Vec<CorpusDocument>, AutolinkError> {
            Err(AutolinkError::Corpus("vault went away".into()))
        }

        fn read(&self, _document: &CorpusDocument) -> Result<String, AutolinkError> {
            unreachable!("documents() never succeeds")
        }
    }

    fn corpus() -> InMemoryCorpus {
        InMemoryCorpus::with_documents([
            ("Cat.md", "A cat."),
            ("Cat Dog.md", "---\naliases: [Catdog]\n---\n"),
        ])
    }

    #[test]
    fn rebuild_publishes_a_new_index_and_reports_progress() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = LinkEngine::with_observer(Settings::default(), observer.clone());
        assert!(engine.snapshot().is_empty());

        let outcome = engine.rebuild_index(&corpus()).unwrap();
        let RebuildOutcome::Completed(stats) = outcome else {
            panic!("expected a completed rebuild");
        };
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.destinations, 3);
        assert_eq!(engine.snapshot().len(), 3);
        assert!(!engine.is_rebuilding());

        let lines = observer.lines.lock();
        assert_eq!(lines.first().map(String::as_str), Some("Searching files... 0/2 processed"));
        assert!(lines.iter().any(|line| line == "Indexing link database..."));
        assert!(lines.last().unwrap().starts_with("Updated in "));
    }

    #[test]
    fn failed_rebuild_keeps_previous_index() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = LinkEngine::with_observer(Settings::default(), observer.clone());
        engine.rebuild_index(&corpus()).unwrap();
        let before = engine.snapshot();

        let err = engine.rebuild_index(&BrokenCorpus).unwrap_err();
        assert!(matches!(err, AutolinkError::Corpus(_)));
        assert!(Arc::ptr_eq(&before, &engine.snapshot()));
        assert!(!engine.is_rebuilding());
        assert_eq!(observer.lines.lock().last().map(String::as_str), Some("Error updating index"));
    }

    #[test]
    fn settings_gate_suggestions_and_highlighting() {
        let engine = LinkEngine::new(Settings::default());
        engine.rebuild_index(&corpus()).unwrap();

        assert_eq!(engine.suggestions("my cat", ()).len(), 1);
        assert!(engine.autocomplete("my cat", ()).is_empty());
        assert_eq!(engine.visible_spans("my cat").len(), 1);

        let stale = engine.set_settings(Settings {
            use_suggestions: true,
            real_time_linking: false,
            ..Settings::default()
        });
        assert!(!stale);
        assert_eq!(engine.autocomplete("my cat", ()).len(), 1);
        assert!(engine.visible_spans("my cat").is_empty());
        assert_eq!(engine.scan_text("my cat").len(), 1);
    }

    #[test]
    fn autocomplete_lists_every_bucket_with_preferred_first() {
        let engine = LinkEngine::new(Settings {
            use_suggestions: true,
            tie_break: TieBreak::ShortestPath,
            ..Settings::default()
        });
        let corpus = InMemoryCorpus::with_documents([
            ("zoo/Dog.md", ""),
            ("Cat Dog.md", ""),
            ("Dog.md", ""),
        ]);
        engine.rebuild_index(&corpus).unwrap();

        let offered = engine.autocomplete("a cat dog", ());
        let paths: Vec<&str> = offered
            .iter()
            .map(|s| s.destination.link_path.as_str())
            .collect();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], "Cat Dog.md");
        assert!(paths.contains(&"Dog.md"));
        assert!(paths.contains(&"zoo/Dog.md"));
    }

    #[test]
    fn changing_build_options_marks_index_stale() {
        let engine = LinkEngine::new(Settings::default());
        assert!(engine.set_settings(Settings {
            lemmatize_terms: false,
            ..Settings::default()
        }));
        assert!(!engine.set_settings(Settings {
            lemmatize_terms: false,
            tie_break: TieBreak::Alphabetical,
            ..Settings::default()
        }));
    }

    #[test]
    fn best_suggestion_prefers_longest_match() {
        let engine = LinkEngine::new(Settings::default());
        engine.rebuild_index(&corpus()).unwrap();
        let best = engine.best_suggestion("the cat dog", 4usize).unwrap();
        assert_eq!(best.destination.link_path, "Cat Dog.md");
        assert_eq!(best.text, "cat dog");
        assert_eq!(best.anchor, 4);
    }
}
