//! Term splitting and normalization.
//!
//! A *term* is a maximal run of ASCII alphanumeric characters; everything else is a
//! delimiter. Offsets are byte offsets. Every multi-byte character is a delimiter, so all
//! offsets produced here fall on `char` boundaries.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use rust_stemmers::{Algorithm, Stemmer};

/// Returns `true` when `byte` belongs to a term.
#[inline]
pub fn is_term_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

/// Iterator over the byte ranges of the terms in a string.
#[derive(Clone, Debug)]
pub struct Words<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Iterator for Words<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        let len = self.bytes.len();
        while self.pos < len && !is_term_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos >= len {
            return None;
        }
        let start = self.pos;
        while self.pos < len && is_term_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        Some(start..self.pos)
    }
}

/// Byte ranges of every term in `text`, left to right.
pub fn words(text: &str) -> Words<'_> {
    Words {
        bytes: text.as_bytes(),
        pos: 0,
    }
}

/// Number of terms in `term`.
pub fn count_terms(term: &str) -> usize {
    words(term).count()
}

/// Offsets immediately after each run of delimiters, plus `text.len()`.
///
/// These are the only positions a match can end at once trailing delimiters are
/// trimmed, which keeps scanning proportional to the number of words.
pub fn split_boundaries(text: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let mut in_delimiters = false;
    for (idx, byte) in text.bytes().enumerate() {
        let delimiter = !is_term_byte(byte);
        if in_delimiters && !delimiter {
            out.push(idx);
        }
        in_delimiters = delimiter;
    }
    out.push(text.len());
    out
}

/// Start offsets of up to `limit` trailing words of `text`, nearest word first.
pub fn trailing_word_starts(text: &str, limit: usize) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(limit);
    let mut pos = bytes.len();
    while out.len() < limit {
        while pos > 0 && !is_term_byte(bytes[pos - 1]) {
            pos -= 1;
        }
        if pos == 0 {
            break;
        }
        while pos > 0 && is_term_byte(bytes[pos - 1]) {
            pos -= 1;
        }
        out.push(pos);
    }
    out
}

/// Strips the trailing delimiter run from `text`.
pub fn trim_trailing_delimiters(text: &str) -> &str {
    let end = text
        .bytes()
        .rposition(is_term_byte)
        .map(|idx| idx + 1)
        .unwrap_or(0);
    &text[..end]
}

/// Canonicalizes terms into comparable keys.
///
/// Keys are the lowercased terms joined by `-`, each optionally reduced to its stem.
/// Normalizing a key again returns the same key.
#[derive(Clone)]
pub struct Normalizer {
    stemmer: Option<Arc<Stemmer>>,
}

impl Normalizer {
    pub fn new(stem: bool) -> Self {
        let stemmer = stem.then(|| Arc::new(Stemmer::create(Algorithm::English)));
        Self { stemmer }
    }

    /// Normalizer that leaves words unstemmed.
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_stemming(&self) -> bool {
        self.stemmer.is_some()
    }

    pub fn normalize(&self, term: &str) -> String {
        let mut out = String::with_capacity(term.len());
        for range in words(term) {
            let word = term[range].to_ascii_lowercase();
            if !out.is_empty() {
                out.push('-');
            }
            match &self.stemmer {
                Some(stemmer) => out.push_str(&stem_fully(stemmer, word)),
                None => out.push_str(&word),
            }
        }
        out
    }
}

const MAX_STEM_PASSES: usize = 8;

/// Stems `word` until the stemmer leaves it unchanged.
fn stem_fully(stemmer: &Stemmer, mut word: String) -> String {
    for _ in 0..MAX_STEM_PASSES {
        let stemmed = stemmer.stem(&word);
        if stemmed == word.as_str() {
            break;
        }
        word = stemmed.into_owned();
    }
    word
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::plain()
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("stemming", &self.is_stemming())
            .finish()
    }
}
