use std::process::ExitCode;

use serde_json::json;

use crate::commands::CommandResult;
use crate::error::CliError;

pub enum OutputFormat {
    Text,
    Json,
}

/// Renders a `CommandResult` as human-readable text or a single JSON line and maps it
/// to the process exit code.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) {
    match result {
        CommandResult::VaultInitialized {
            root,
            settings,
            created,
            dry_run,
        } => {
            if *dry_run {
                if *created {
                    println!("Dry run: would initialize vault at {root} (settings at {settings})");
                } else {
                    println!("Dry run: vault already initialized at {root} (settings at {settings})");
                }
            } else if *created {
                println!("Initialized vault at {root} (settings: {settings})");
            } else {
                println!("Vault already initialized at {root} (settings: {settings})");
            }
        }
        CommandResult::IndexRebuilt { stats, buckets } => {
            println!(
                "Indexed {} destinations from {} documents in {}ms (longest term: {} words)",
                stats.destinations,
                stats.documents,
                stats.elapsed.as_millis(),
                stats.max_num_terms
            );
            for bucket in buckets {
                let unit = if bucket.num_terms == 1 { "word" } else { "words" };
                println!("  {} {unit}: {}", bucket.num_terms, bucket.destinations);
            }
            if stats.skipped > 0 {
                println!("  skipped {} unreadable documents", stats.skipped);
            }
        }
        CommandResult::Suggestions { query, suggestions } => {
            if suggestions.is_empty() {
                println!("No suggestions for '{query}'");
                return;
            }
            println!("Suggestions for '{query}' ({}):", suggestions.len());
            for suggestion in suggestions {
                println!(
                    "  - {} -> {} ({:?})",
                    suggestion.text, suggestion.destination.link_path, suggestion.destination.kind
                );
            }
        }
        CommandResult::Spans { path, lines } => {
            if lines.is_empty() {
                println!("No linkable spans in {path}");
                return;
            }
            for line in lines {
                for span in &line.spans {
                    println!(
                        "{path}:{}:{}: {} -> {}",
                        line.line,
                        span.from + 1,
                        span.text(),
                        span.link_path()
                    );
                }
            }
        }
        CommandResult::Linked {
            path,
            links,
            written,
            content,
        } => {
            if *written {
                println!("Linked {links} mentions in {path}");
            } else {
                print!("{content}");
            }
        }
        CommandResult::Backlinks { target, mentions } => {
            if mentions.is_empty() {
                println!("No unlinked mentions of {target}");
                return;
            }
            println!("Unlinked mentions of {target} ({}):", mentions.len());
            for mention in mentions {
                println!(
                    "  {}:{}: {} -> {}",
                    mention.source, mention.line, mention.text, mention.link_path
                );
            }
        }
    }
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    let payload = json!(result);
    println!("{payload}");
    Ok(())
}
