use rayon::prelude::*;
use serde::Serialize;

use crate::corpus::Corpus;
use crate::engine::LinkEngine;
use crate::error::AutolinkError;
use crate::index::DestinationIndex;
use crate::linker::scan_document;
use crate::scanner::{Span, TextScanner};

/// Text in another document that could link to the target but does not yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mention {
    pub source: String,
    /// 1-based line number within `source`.
    pub line: usize,
    pub text: String,
    /// Destination inside the target the text resolves to.
    pub link_path: String,
}

/// Every unlinked mention of the document at `target` across the corpus.
///
/// A span counts when any destination sharing its key lives in `target`, so the target's
/// aliases and blocks are found even when the scanner would prefer another document.
pub fn unlinked_mentions(
    engine: &LinkEngine,
    corpus: &dyn Corpus,
    target: &str,
) -> Result<Vec<Mention>, AutolinkError> {
    let index = engine.snapshot();
    let scanner = TextScanner::new(&index, engine.settings().tie_break);
    let documents = corpus.documents()?;

    let mut mentions: Vec<Mention> = documents
        .par_iter()
        .filter(|document| document.path != target)
        .flat_map_iter(|document| {
            let content = match &document.content {
                Some(content) => content.clone(),
                None => match corpus.read(document) {
                    Ok(content) => content,
                    Err(err) => {
                        tracing::warn!(path = %document.path, error = %err, "skipping unreadable document");
                        return Vec::new();
                    }
                },
            };

            let mut found = Vec::new();
            for line in scan_document(&scanner, &content, Some(&document.path)) {
                for span in &line.spans {
                    if let Some(link_path) = target_destination(&index, span, target) {
                        found.push(Mention {
                            source: document.path.clone(),
                            line: line.line,
                            text: span.text().to_string(),
                            link_path,
                        });
                    }
                }
            }
            found
        })
        .collect();

    mentions.sort_by(|a, b| a.source.cmp(&b.source).then(a.line.cmp(&b.line)));
    Ok(mentions)
}

fn target_destination(index: &DestinationIndex, span: &Span, target: &str) -> Option<String> {
    let matched = &span.suggestion.destination;
    index
        .lookup(&matched.search_value, matched.num_terms)
        .iter()
        .find(|destination| destination.document_path() == target)
        .map(|destination| destination.link_path.clone())
}
