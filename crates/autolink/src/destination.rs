use std::cmp::Ordering;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Where a destination was discovered inside its document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    /// The document's own file name.
    File,
    /// A `^block-id` marker at the end of a line.
    Block,
    /// An entry of the front matter `aliases` list.
    Alias,
}

/// Candidate target for a generated link.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkDestination {
    /// Document path, optionally suffixed with `#^block-id`.
    pub link_path: String,
    /// Normalized key the destination is matched by.
    pub search_value: String,
    /// Number of terms in the source term before normalization.
    pub num_terms: usize,
    pub kind: DestinationKind,
}

impl LinkDestination {
    /// Ordering used by the destination index: term count, then key.
    pub fn index_order(&self, other: &Self) -> Ordering {
        self.num_terms
            .cmp(&other.num_terms)
            .then_with(|| self.search_value.cmp(&other.search_value))
    }

    /// Path of the document this destination lives in, without any block anchor.
    pub fn document_path(&self) -> &str {
        match self.link_path.split_once("#^") {
            Some((path, _)) => path,
            None => &self.link_path,
        }
    }
}

/// A proposed replacement of `text` with a link to `destination`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Suggestion<A> {
    /// Matched suffix of the query, original delimiters preserved.
    pub text: String,
    pub destination: LinkDestination,
    /// Consumer-supplied position the query was taken relative to.
    pub anchor: A,
    /// Location of `text` inside the query.
    pub range: Range<usize>,
}
