use autolink::{LineSpans, Mention, RebuildStats, Suggestion};
use serde::Serialize;

use crate::error::ExitStatus;

pub mod backlinks;
pub mod index;
pub mod init;
pub mod link;
pub mod scan;
pub mod suggest;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    VaultInitialized {
        root: String,
        settings: String,
        created: bool,
        dry_run: bool,
    },
    IndexRebuilt {
        stats: RebuildStats,
        buckets: Vec<index::BucketSummary>,
    },
    Suggestions {
        query: String,
        suggestions: Vec<Suggestion<()>>,
    },
    Spans {
        path: String,
        lines: Vec<LineSpans>,
    },
    Linked {
        path: String,
        links: usize,
        written: bool,
        content: String,
    },
    Backlinks {
        target: String,
        mentions: Vec<Mention>,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::IndexRebuilt { stats, .. } => {
                if stats.skipped == 0 {
                    ExitStatus::Ok
                } else {
                    ExitStatus::Data
                }
            }
            _ => ExitStatus::Ok,
        }
    }
}
