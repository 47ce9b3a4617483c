use std::fs;

use autolink::{TextScanner, scan_document};
use clap::{Arg, ArgMatches, Command};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util::resolve_document;

pub fn command() -> Command {
    Command::new("scan")
        .about("Show every linkable span in a document")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .required(true)
                .help("Document to scan, relative to the current directory or the vault root."),
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
    let lines = scan_document(&scanner, &content, Some(&document.link_path));

    Ok(CommandResult::Spans {
        path: document.link_path,
        lines,
    })
}
