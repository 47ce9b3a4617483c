use serde::Serialize;

use crate::destination::Suggestion;
use crate::index::DestinationIndex;
use crate::resolver::{SuggestionResolver, TieBreak};
use crate::terms::split_boundaries;

/// A linkable region of scanned text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Span {
    pub suggestion: Suggestion<()>,
    pub from: usize,
    pub to: usize,
}

impl Span {
    pub fn link_path(&self) -> &str {
        &self.suggestion.destination.link_path
    }

    pub fn text(&self) -> &str {
        &self.suggestion.text
    }
}

/// Finds every non-overlapping link span in a run of text.
///
/// Boundaries are visited right to left. Boundary `j` closes word slot `j`; an accepted
/// match of `n` terms claims slots `j - n + 1 ..= j`, and claimed slots are never
/// resolved again, so longer and right-anchored matches win.
#[derive(Clone, Copy, Debug)]
pub struct TextScanner<'a> {
    resolver: SuggestionResolver<'a>,
    tie_break: TieBreak,
}

impl<'a> TextScanner<'a> {
    pub fn new(index: &'a DestinationIndex, tie_break: TieBreak) -> Self {
        Self {
            resolver: SuggestionResolver::new(index),
            tie_break,
        }
    }

    pub fn scan(&self, text: &str) -> Vec<Span> {
        self.scan_filtered(text, |_| true)
    }

    /// Like [`TextScanner::scan`], but only suggestions passing `accept` may claim slots.
    ///
    /// A rejected match falls back to the shorter matches ending at the same boundary.
    pub fn scan_filtered<F>(&self, text: &str, accept: F) -> Vec<Span>
    where
        F: Fn(&Suggestion<()>) -> bool,
    {
        if text.is_empty() || self.resolver.index().is_empty() {
            return Vec::new();
        }

        let boundaries = split_boundaries(text);
        let mut claimed = vec![false; boundaries.len()];
        let mut spans = Vec::new();

        for slot in (0..boundaries.len()).rev() {
            if claimed[slot] {
                continue;
            }
            let offset = boundaries[slot];
            let suggestions = self
                .resolver
                .resolve(&text[..offset], ())
                .into_iter()
                .filter(|suggestion| accept(suggestion))
                .collect();
            let Some(suggestion) = self.tie_break.choose(suggestions) else {
                continue;
            };

            let consumed = suggestion.destination.num_terms.max(1);
            for earlier in slot.saturating_sub(consumed - 1)..slot {
                claimed[earlier] = true;
            }

            spans.push(Span {
                from: suggestion.range.start,
                to: suggestion.range.end,
                suggestion,
            });
        }

        spans.reverse();
        spans
    }
}
