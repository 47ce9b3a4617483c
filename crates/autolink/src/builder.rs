use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use crate::blocks::block_ids;
use crate::corpus::{Corpus, CorpusDocument};
use crate::destination::{DestinationKind, LinkDestination};
use crate::error::AutolinkError;
use crate::front_matter::aliases_or_empty;
use crate::index::DestinationIndex;
use crate::settings::Settings;
use crate::status::{RebuildObserver, RebuildStatus};
use crate::terms::{Normalizer, count_terms};

/// Knobs of a single index build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    pub search_file_content: bool,
    pub stem: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for BuildOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            search_file_content: settings.search_file_content,
            stem: settings.lemmatize_terms,
        }
    }
}

/// Counters describing one completed build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RebuildStats {
    pub documents: usize,
    /// Documents whose content was read or taken from memory.
    pub read: usize,
    /// Documents whose content could not be read.
    pub skipped: usize,
    pub destinations: usize,
    pub max_num_terms: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// Turns a corpus into a [`DestinationIndex`].
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexBuilder {
    options: BuildOptions,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ContentState {
    NotRead,
    Read,
    Unreadable,
}

struct Extracted {
    destinations: Vec<LinkDestination>,
    content: ContentState,
}

impl IndexBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Reads every document concurrently and assembles the index once all reads finish.
    ///
    /// Only a failure to enumerate the corpus is an error; a document that cannot be read
    /// contributes no destinations and is counted as skipped.
    pub fn build(
        &self,
        corpus: &dyn Corpus,
        observer: &dyn RebuildObserver,
    ) -> Result<(DestinationIndex, RebuildStats), AutolinkError> {
        let started = Instant::now();
        let normalizer = Normalizer::new(self.options.stem);
        let documents = corpus.documents()?;
        let total = documents.len();

        observer.report(&RebuildStatus::Searching {
            processed: 0,
            total,
            eta_seconds: None,
        });

        let processed = AtomicUsize::new(0);
        let extracted: Vec<Extracted> = documents
            .par_iter()
            .map(|document| {
                let result = self.extract(corpus, document, &normalizer);
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                observer.report(&RebuildStatus::Searching {
                    processed: done,
                    total,
                    eta_seconds: Some(eta_seconds(started.elapsed(), done, total)),
                });
                result
            })
            .collect();

        observer.report(&RebuildStatus::Indexing);

        let mut stats = RebuildStats {
            documents: total,
            ..RebuildStats::default()
        };
        let mut destinations = Vec::new();
        for item in extracted {
            match item.content {
                ContentState::Read => stats.read += 1,
                ContentState::Unreadable => stats.skipped += 1,
                ContentState::NotRead => {}
            }
            destinations.extend(item.destinations);
        }

        let index = DestinationIndex::from_destinations(destinations, normalizer);
        stats.destinations = index.len();
        stats.max_num_terms = index.max_num_terms();
        stats.elapsed = started.elapsed();
        Ok((index, stats))
    }

    fn extract(
        &self,
        corpus: &dyn Corpus,
        document: &CorpusDocument,
        normalizer: &Normalizer,
    ) -> Extracted {
        if !self.options.search_file_content {
            return Extracted {
                destinations: document_destinations(document, None, normalizer),
                content: ContentState::NotRead,
            };
        }

        let content = match &document.content {
            Some(content) => Cow::Borrowed(content.as_str()),
            None => match corpus.read(document) {
                Ok(content) => Cow::Owned(content),
                Err(err) => {
                    tracing::warn!(path = %document.path, error = %err, "skipping unreadable document");
                    return Extracted {
                        destinations: Vec::new(),
                        content: ContentState::Unreadable,
                    };
                }
            },
        };
        Extracted {
            destinations: document_destinations(document, Some(content.as_ref()), normalizer),
            content: ContentState::Read,
        }
    }
}

/// Destinations a single document contributes.
///
/// Without `content` only the file identity is produced.
pub fn document_destinations(
    document: &CorpusDocument,
    content: Option<&str>,
    normalizer: &Normalizer,
) -> Vec<LinkDestination> {
    let mut out = Vec::new();
    push_destination(
        &mut out,
        normalizer,
        document.path.clone(),
        document.basename(),
        DestinationKind::File,
    );

    let Some(content) = content else {
        return out;
    };
    let content = normalize_newlines(content);

    for alias in aliases_or_empty(&content, &document.path) {
        push_destination(
            &mut out,
            normalizer,
            document.path.clone(),
            &alias,
            DestinationKind::Alias,
        );
    }
    for id in block_ids(&content) {
        push_destination(
            &mut out,
            normalizer,
            format!("{}#^{id}", document.path),
            id,
            DestinationKind::Block,
        );
    }
    out
}

fn push_destination(
    out: &mut Vec<LinkDestination>,
    normalizer: &Normalizer,
    link_path: String,
    term: &str,
    kind: DestinationKind,
) {
    let num_terms = count_terms(term);
    if num_terms == 0 {
        return;
    }
    out.push(LinkDestination {
        link_path,
        search_value: normalizer.normalize(term),
        num_terms,
        kind,
    });
}

fn normalize_newlines(content: &str) -> Cow<'_, str> {
    if content.contains('\r') {
        Cow::Owned(content.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(content)
    }
}

fn eta_seconds(elapsed: Duration, done: usize, total: usize) -> f64 {
    if done == 0 {
        return 0.0;
    }
    let per_document = elapsed.as_secs_f64() / done as f64;
    per_document * total.saturating_sub(done) as f64
}
