use serde::{Deserialize, Serialize};

use crate::destination::Suggestion;
use crate::index::DestinationIndex;
use crate::terms::{trailing_word_starts, trim_trailing_delimiters};

/// Resolves the destinations whose key matches a suffix of a query.
#[derive(Clone, Copy, Debug)]
pub struct SuggestionResolver<'a> {
    index: &'a DestinationIndex,
}

impl<'a> SuggestionResolver<'a> {
    pub fn new(index: &'a DestinationIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a DestinationIndex {
        self.index
    }

    /// Every destination matching a suffix of `query`, longest term count first.
    ///
    /// Trailing delimiters of `query` never belong to a match. Each bucket that matches
    /// contributes all of its destinations; picking among them is left to the caller.
    pub fn resolve<A: Clone>(&self, query: &str, anchor: A) -> Vec<Suggestion<A>> {
        let max_num_terms = self.index.max_num_terms();
        if max_num_terms == 0 {
            return Vec::new();
        }

        let trimmed = trim_trailing_delimiters(query);
        let end = trimmed.len();
        let starts = trailing_word_starts(trimmed, max_num_terms);

        let mut suggestions = Vec::new();
        for num_terms in (1..=starts.len()).rev() {
            let start = starts[num_terms - 1];
            let candidate = &trimmed[start..end];
            let key = self.index.normalize(candidate);

            for destination in self.index.lookup(&key, num_terms) {
                suggestions.push(Suggestion {
                    text: candidate.to_string(),
                    destination: destination.clone(),
                    anchor: anchor.clone(),
                    range: start..end,
                });
            }
        }
        suggestions
    }
}

/// How a consumer that acts on one suggestion picks among equally long matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Index order of the destinations sharing the matched key.
    #[default]
    First,
    /// Keep every suggestion; single-choice consumers take the first.
    All,
    /// Shortest link path, then alphabetical.
    ShortestPath,
    /// Alphabetical by link path.
    Alphabetical,
}

impl TieBreak {
    /// Narrows resolver output to the suggestions a consumer should act on.
    ///
    /// Only suggestions of the longest matched term count compete; `All` passes the
    /// input through untouched.
    pub fn apply<A>(self, mut suggestions: Vec<Suggestion<A>>) -> Vec<Suggestion<A>> {
        if self == TieBreak::All {
            return suggestions;
        }
        match self.preferred(&suggestions) {
            Some(idx) => vec![suggestions.swap_remove(idx)],
            None => Vec::new(),
        }
    }

    /// The single suggestion a "take one" consumer should use.
    pub fn choose<A>(self, suggestions: Vec<Suggestion<A>>) -> Option<Suggestion<A>> {
        self.apply(suggestions).into_iter().next()
    }

    /// Keeps every suggestion for pickers, moving the preferred one to the front.
    pub fn rank<A>(self, mut suggestions: Vec<Suggestion<A>>) -> Vec<Suggestion<A>> {
        if let Some(idx) = self.preferred(&suggestions) {
            let preferred = suggestions.remove(idx);
            suggestions.insert(0, preferred);
        }
        suggestions
    }

    fn preferred<A>(self, suggestions: &[Suggestion<A>]) -> Option<usize> {
        let longest = suggestions.first()?.destination.num_terms;
        let mut group = suggestions
            .iter()
            .enumerate()
            .take_while(|(_, s)| s.destination.num_terms == longest);

        let chosen = match self {
            TieBreak::First | TieBreak::All => group.next(),
            TieBreak::ShortestPath => group.min_by(|(_, a), (_, b)| {
                let (a, b) = (&a.destination.link_path, &b.destination.link_path);
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }),
            TieBreak::Alphabetical => group.min_by(|(_, a), (_, b)| {
                a.destination.link_path.cmp(&b.destination.link_path)
            }),
        };
        chosen.map(|(idx, _)| idx)
    }
}
