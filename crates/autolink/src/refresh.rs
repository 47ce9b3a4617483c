use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::debounce::Debouncer;
use crate::engine::{LinkEngine, RebuildOutcome};
use crate::error::AutolinkError;

/// Quiet period before edits inside documents trigger a rebuild.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(2000);

/// When corpus changes should refresh the index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Structural changes rebuild at once; content edits rebuild after a quiet period.
    #[default]
    Always,
    /// Only files being created, deleted or renamed trigger a rebuild.
    #[serde(rename = "main", alias = "on-structural-change")]
    OnStructuralChange,
    Never,
}

/// A change in the corpus reported by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorpusEvent {
    Created(String),
    Deleted(String),
    Renamed { from: String, to: String },
    Modified(String),
    /// The user typed inside a `^block-id` marker.
    BlockIdEdited(String),
}

impl CorpusEvent {
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CorpusEvent::Created(_) | CorpusEvent::Deleted(_) | CorpusEvent::Renamed { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshAction {
    Rebuild,
    Debounce,
    Ignore,
}

impl RefreshPolicy {
    pub fn action_for(self, event: &CorpusEvent) -> RefreshAction {
        match (self, event) {
            (RefreshPolicy::Never, _) => RefreshAction::Ignore,
            (_, event) if event.is_structural() => RefreshAction::Rebuild,
            (_, CorpusEvent::BlockIdEdited(_)) => RefreshAction::Debounce,
            (RefreshPolicy::Always, CorpusEvent::Modified(_)) => RefreshAction::Debounce,
            _ => RefreshAction::Ignore,
        }
    }
}

/// Keeps an engine's index in step with corpus events.
pub struct AutoRefresh {
    engine: Arc<LinkEngine>,
    corpus: Arc<dyn Corpus>,
    debouncer: Debouncer,
}

impl AutoRefresh {
    pub fn new(engine: Arc<LinkEngine>, corpus: Arc<dyn Corpus>) -> Result<Self, AutolinkError> {
        Self::with_quiet_period(engine, corpus, DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(
        engine: Arc<LinkEngine>,
        corpus: Arc<dyn Corpus>,
        quiet_period: Duration,
    ) -> Result<Self, AutolinkError> {
        let debounced_engine = Arc::clone(&engine);
        let debounced_corpus = Arc::clone(&corpus);
        let debouncer = Debouncer::new(quiet_period, move || {
            // Failures are already reported through the engine's observer.
            let _ = debounced_engine.rebuild_index(debounced_corpus.as_ref());
        })?;

        Ok(Self {
            engine,
            corpus,
            debouncer,
        })
    }

    pub fn engine(&self) -> &Arc<LinkEngine> {
        &self.engine
    }

    /// Applies the engine's current refresh policy to `event`.
    ///
    /// Returns the rebuild outcome when the event rebuilt synchronously.
    pub fn notify(&self, event: &CorpusEvent) -> Result<Option<RebuildOutcome>, AutolinkError> {
        let policy = self.engine.settings().auto_refresh_links;
        let action = policy.action_for(event);
        tracing::debug!(?event, ?policy, ?action, "corpus event");

        match action {
            RefreshAction::Rebuild => {
                self.debouncer.cancel();
                self.engine
                    .rebuild_index(self.corpus.as_ref())
                    .map(Some)
            }
            RefreshAction::Debounce => {
                self.debouncer.call();
                Ok(None)
            }
            RefreshAction::Ignore => Ok(None),
        }
    }

    pub fn has_pending_rebuild(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn shutdown(&self) {
        self.debouncer.shutdown();
    }
}
