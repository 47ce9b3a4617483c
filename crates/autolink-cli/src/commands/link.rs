use std::fs;

use autolink::{TextScanner, link_document, write_atomic};
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util::resolve_document;

pub fn command() -> Command {
    Command::new("link")
        .about("Rewrite every linkable span of a document as a wiki link")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .required(true)
                .help("Document to link, relative to the current directory or the vault root."),
        )
        .arg(
            Arg::new("write")
                .long("write")
                .action(ArgAction::SetTrue)
                .help("Save the result over the document instead of printing it."),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let raw = matches
        .get_one::<String>("file")
        .ok_or_else(|| CliError::new("missing file", ExitStatus::Usage))?;
    let document = resolve_document(&session.vault, raw)?;
    let content = fs::read_to_string(&document.absolute)?;

    session.rebuild()?;
    let index = session.engine.snapshot();
    let scanner = TextScanner::new(&index, session.engine.settings().tie_break);
    let linked = link_document(&scanner, &content, Some(&document.link_path));

    let write = matches.get_flag("write");
    if write && linked.links > 0 {
        write_atomic(&document.absolute, &linked.content)?;
        tracing::info!(path = %document.link_path, links = linked.links, "document linked");
    }

    Ok(CommandResult::Linked {
        path: document.link_path,
        links: linked.links,
        written: write,
        content: linked.content,
    })
}
