//! Turning matched spans into wiki links.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::blocks::is_editing_block_id;
use crate::destination::Suggestion;
use crate::engine::LinkEngine;
use crate::front_matter::body_after_front_matter;
use crate::scanner::{Span, TextScanner};

/// `[[link_path|text]]`.
pub fn render_wikilink(link_path: &str, text: &str) -> String {
    format!("[[{link_path}|{text}]]")
}

/// Keys that complete a term while typing: anything but letters, digits and `-`.
pub fn is_interrupter(ch: char) -> bool {
    !ch.is_ascii_alphanumeric() && ch != '-'
}

fn protected_regex() -> &'static Regex {
    static PROTECTED: OnceLock<Regex> = OnceLock::new();
    PROTECTED.get_or_init(|| {
        Regex::new(
            r"\[\[[^\]\n]*\]\]|!?\[[^\]\n]*\]\([^)\n]*\)|`[^`\n]*`|<https?://[^>\s]*>|https?://\S+",
        )
        .expect("Invalid regex")
    })
}

/// Byte ranges of `line` that must never be rewritten: links, inline code and URLs.
pub fn protected_ranges(line: &str) -> Vec<Range<usize>> {
    protected_regex()
        .find_iter(line)
        .map(|m| m.range())
        .collect()
}

fn overlaps(protected: &[Range<usize>], from: usize, to: usize) -> bool {
    protected
        .iter()
        .any(|range| from < range.end && range.start < to)
}

fn links_to(suggestion_path: &str, self_path: Option<&str>) -> bool {
    self_path.is_some_and(|path| path == suggestion_path)
}

/// A completed term to replace with a link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AutoLink {
    /// Portion of the line to replace.
    pub range: Range<usize>,
    pub replacement: String,
    /// Anchored at the cursor position before the interrupter.
    pub suggestion: Suggestion<usize>,
}

impl AutoLink {
    pub fn apply(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len() + self.replacement.len());
        out.push_str(&line[..self.range.start]);
        out.push_str(&self.replacement);
        out.push_str(&line[self.range.end..]);
        out
    }
}

/// The link to insert after the user typed the character just before `cursor`.
///
/// Returns `None` when auto linking is off, the typed character does not complete a term,
/// the cursor is inside a block marker, or the match would land in an existing link.
pub fn auto_link(
    engine: &LinkEngine,
    line: &str,
    cursor: usize,
    self_path: Option<&str>,
) -> Option<AutoLink> {
    if !engine.settings().use_auto_link || line.is_empty() {
        return None;
    }
    if is_editing_block_id(line, cursor) {
        return None;
    }

    let head = line.get(..cursor)?;
    let typed = head.chars().next_back()?;
    if !is_interrupter(typed) {
        return None;
    }
    let before = cursor - typed.len_utf8();

    let protected = protected_ranges(line);
    let candidates = engine
        .suggestions(&head[..before], before)
        .into_iter()
        .filter(|suggestion| linkable(suggestion, &protected, self_path))
        .collect();
    let suggestion = engine.settings().tie_break.choose(candidates)?;

    Some(AutoLink {
        range: suggestion.range.clone(),
        replacement: render_wikilink(&suggestion.destination.link_path, &suggestion.text),
        suggestion,
    })
}

/// Linkable spans of one line of a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineSpans {
    /// 1-based line number.
    pub line: usize,
    /// Byte offset of the line within the document.
    pub offset: usize,
    pub spans: Vec<Span>,
}

#[derive(Clone)]
struct FenceState {
    ch: char,
    len: usize,
}

fn fence_update(current: Option<&FenceState>, line: &str) -> Option<Option<FenceState>> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = match trimmed.chars().next() {
        Some(ch @ ('`' | '~')) => ch,
        _ => return None,
    };
    let run = trimmed.chars().take_while(|c| *c == ch).count();
    if run < 3 {
        return None;
    }

    match current {
        None => Some(Some(FenceState { ch, len: run })),
        Some(open) if open.ch == ch && run >= open.len => Some(None),
        Some(_) => None,
    }
}

/// Spans for every line of `content` outside front matter and fenced code.
///
/// Spans overlapping existing links or inline code, and spans pointing back at
/// `self_path`, are dropped.
pub fn scan_document(
    scanner: &TextScanner<'_>,
    content: &str,
    self_path: Option<&str>,
) -> Vec<LineSpans> {
    let body_start = content.len() - body_after_front_matter(content).len();
    let mut fence: Option<FenceState> = None;
    let mut offset = 0;
    let mut out = Vec::new();

    for (idx, raw) in content.split_inclusive('\n').enumerate() {
        let line_offset = offset;
        offset += raw.len();
        if line_offset < body_start {
            continue;
        }

        let line = raw.trim_end_matches(['\n', '\r']);
        if let Some(updated) = fence_update(fence.as_ref(), line) {
            fence = updated;
            continue;
        }
        if fence.is_some() {
            continue;
        }

        let spans = link_spans(scanner, line, self_path);
        if !spans.is_empty() {
            out.push(LineSpans {
                line: idx + 1,
                offset: line_offset,
                spans,
            });
        }
    }
    out
}

fn link_spans(scanner: &TextScanner<'_>, line: &str, self_path: Option<&str>) -> Vec<Span> {
    let protected = protected_ranges(line);
    scanner.scan_filtered(line, |suggestion| linkable(suggestion, &protected, self_path))
}

fn linkable<A>(
    suggestion: &Suggestion<A>,
    protected: &[Range<usize>],
    self_path: Option<&str>,
) -> bool {
    !overlaps(protected, suggestion.range.start, suggestion.range.end)
        && !links_to(suggestion.destination.document_path(), self_path)
}

/// `line` with every linkable span rewritten as a wiki link.
pub fn link_line(scanner: &TextScanner<'_>, line: &str, self_path: Option<&str>) -> String {
    apply_spans(line, &link_spans(scanner, line, self_path))
}

fn apply_spans(text: &str, spans: &[Span]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        out.push_str(&text[cursor..span.from]);
        out.push_str(&render_wikilink(span.link_path(), &text[span.from..span.to]));
        cursor = span.to;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Result of [`link_document`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkedDocument {
    pub content: String,
    pub links: usize,
}

/// `content` with every linkable span outside front matter and fenced code linked.
pub fn link_document(
    scanner: &TextScanner<'_>,
    content: &str,
    self_path: Option<&str>,
) -> LinkedDocument {
    let lines = scan_document(scanner, content, self_path);
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut links = 0;

    for line in &lines {
        out.push_str(&content[cursor..line.offset]);
        let end = content[line.offset..]
            .find('\n')
            .map(|idx| line.offset + idx)
            .unwrap_or(content.len());
        out.push_str(&apply_spans(&content[line.offset..end], &line.spans));
        links += line.spans.len();
        cursor = end;
    }
    out.push_str(&content[cursor..]);

    LinkedDocument {
        content: out,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::InMemoryCorpus;
    use crate::index::DestinationIndex;
    use crate::resolver::TieBreak;
    use crate::settings::Settings;

    fn engine(auto: bool) -> LinkEngine {
        let engine = LinkEngine::new(Settings {
            use_auto_link: auto,
            ..Settings::default()
        });
        let corpus = InMemoryCorpus::with_documents([
            ("Cat.md", "Cats purr."),
            ("Cell Wall.md", "---\naliases: [plant wall]\n---\nRigid layer ^rigid-layer\n"),
        ]);
        engine.rebuild_index(&corpus).unwrap();
        engine
    }

    fn index(engine: &LinkEngine) -> std::sync::Arc<DestinationIndex> {
        engine.snapshot()
    }

    #[test]
    fn renders_piped_wikilinks() {
        assert_eq!(render_wikilink("a/Cat.md", "cats"), "[[a/Cat.md|cats]]");
    }

    #[test]
    fn auto_link_fires_on_interrupters_only() {
        let engine = engine(true);
        let line = "the cell wall ";
        let link = auto_link(&engine, line, line.len(), None).unwrap();
        assert_eq!(link.range, 4..13);
        assert_eq!(link.replacement, "[[Cell Wall.md|cell wall]]");
        assert_eq!(link.apply(line), "the [[Cell Wall.md|cell wall]] ");
        assert_eq!(link.suggestion.anchor, 13);

        assert!(auto_link(&engine, "the cell wall-", 14, None).is_none());
        assert!(auto_link(&engine, "the cell wall", 13, None).is_none());
        assert!(auto_link(&engine, "", 0, None).is_none());
    }

    #[test]
    fn auto_link_respects_settings_links_and_block_markers() {
        assert!(auto_link(&engine(false), "a cat ", 6, None).is_none());

        let engine = engine(true);
        assert!(auto_link(&engine, "a cat ", 6, Some("Cat.md")).is_none());
        assert!(auto_link(&engine, "see [[Other|cat]] ", 18, None).is_none());
        assert!(auto_link(&engine, "text ^cat", 9, None).is_none());
    }

    #[test]
    fn link_line_skips_existing_links_and_code() {
        let engine = engine(false);
        let index = index(&engine);
        let scanner = TextScanner::new(&index, TieBreak::First);

        assert_eq!(
            link_line(&scanner, "A cat and `cat` and [[Cat.md|cat]].", None),
            "A [[Cat.md|cat]] and `cat` and [[Cat.md|cat]]."
        );
        assert_eq!(link_line(&scanner, "A cat.", Some("Cat.md")), "A cat.");
    }

    #[test]
    fn rejected_links_leave_shorter_matches_available() {
        let engine = LinkEngine::new(Settings {
            use_auto_link: true,
            ..Settings::default()
        });
        let corpus = InMemoryCorpus::with_documents([
            ("Cat Dog.md", ""),
            ("Big Cat.md", ""),
            ("Dog.md", ""),
        ]);
        engine.rebuild_index(&corpus).unwrap();
        let index = index(&engine);
        let scanner = TextScanner::new(&index, TieBreak::First);

        assert_eq!(
            link_line(&scanner, "a big cat dog", Some("Cat Dog.md")),
            "a [[Big Cat.md|big cat]] [[Dog.md|dog]]"
        );
        assert_eq!(
            link_line(&scanner, "see [[Notes|cat]] dog", None),
            "see [[Notes|cat]] [[Dog.md|dog]]"
        );

        let line = "see [[Notes|cat]] dog ";
        let link = auto_link(&engine, line, line.len(), None).unwrap();
        assert_eq!(link.replacement, "[[Dog.md|dog]]");
        assert_eq!(link.range, 18..21);
    }

    #[test]
    fn link_document_leaves_front_matter_and_fences_alone() {
        let engine = engine(false);
        let index = index(&engine);
        let scanner = TextScanner::new(&index, TieBreak::First);

        let content = "---\naliases: [cat]\n---\nMy cat\n```\ncat\n```\nThe plant wall.\n";
        let linked = link_document(&scanner, content, None);
        assert_eq!(linked.links, 2);
        assert_eq!(
            linked.content,
            "---\naliases: [cat]\n---\nMy [[Cat.md|cat]]\n```\ncat\n```\nThe [[Cell Wall.md|plant wall]].\n"
        );

        let lines = scan_document(&scanner, content, None);
        let numbers: Vec<usize> = lines.iter().map(|l| l.line).collect();
        assert_eq!(numbers, vec![4, 8]);
    }

    #[test]
    fn block_destinations_link_with_anchor() {
        let engine = engine(false);
        let index = index(&engine);
        let scanner = TextScanner::new(&index, TieBreak::First);
        assert_eq!(
            link_line(&scanner, "a rigid layer here", None),
            "a [[Cell Wall.md#^rigid-layer|rigid layer]] here"
        );
    }
}
