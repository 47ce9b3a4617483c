use std::sync::OnceLock;

use regex::Regex;

/// A block marker: a space, a caret, then `[A-Za-z0-9-]+` running to the end of the line.
fn block_id_regex() -> &'static Regex {
    static BLOCK_ID: OnceLock<Regex> = OnceLock::new();
    BLOCK_ID.get_or_init(|| Regex::new(r"(?m) \^([A-Za-z0-9-]+)$").expect("Invalid regex"))
}

/// Every block id declared in `content`, in document order.
///
/// `content` is expected to use `\n` line endings.
pub fn block_ids(content: &str) -> Vec<&str> {
    block_id_regex()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Whether the text between the last `" ^"` on `line` and `cursor` is a block marker
/// being typed.
pub fn is_editing_block_id(line: &str, cursor: usize) -> bool {
    let Some(head) = line.get(..cursor) else {
        return false;
    };
    let Some(marker) = head.rfind(" ^") else {
        return false;
    };
    block_id_regex().is_match(&head[marker..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ids_are_anchored_at_line_end() {
        let content = "First paragraph ^intro\nnot a ^marker here\nTrailing ^Cell-Wall\n^no-space\n";
        assert_eq!(block_ids(content), vec!["intro", "Cell-Wall"]);
    }

    #[test]
    fn block_id_at_end_of_content_without_newline() {
        assert_eq!(block_ids("text ^last-one"), vec!["last-one"]);
        assert!(block_ids("text ^under_score").is_empty());
    }

    #[test]
    fn detects_block_id_under_cursor() {
        let line = "Some text ^my-block";
        assert!(is_editing_block_id(line, line.len()));
        assert!(is_editing_block_id(line, 12));
        assert!(!is_editing_block_id(line, 5));
        assert!(!is_editing_block_id("plain text", 10));
        assert!(!is_editing_block_id("x ^", 3));
        assert!(!is_editing_block_id("short", 99));
    }
}
