use autolink::unlinked_mentions;
use clap::{Arg, ArgMatches, Command};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util::resolve_document;

pub fn command() -> Command {
    Command::new("backlinks")
        .about("Find unlinked mentions of a document across the vault")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .required(true)
                .help("Document whose mentions to find."),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let raw = matches
        .get_one::<String>("file")
        .ok_or_else(|| CliError::new("missing file", ExitStatus::Usage))?;
    let document = resolve_document(&session.vault, raw)?;

    session.rebuild()?;
    let mentions = unlinked_mentions(&session.engine, session.corpus.as_ref(), &document.link_path)?;

    Ok(CommandResult::Backlinks {
        target: document.link_path,
        mentions,
    })
}
