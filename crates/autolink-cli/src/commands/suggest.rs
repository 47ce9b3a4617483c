use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};

pub fn command() -> Command {
    Command::new("suggest")
        .about("List link suggestions for the end of a piece of text")
        .arg(
            Arg::new("query")
                .value_name("QUERY")
                .required(true)
                .help("Text ending where the cursor would be."),
        )
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Include shorter matches and every duplicate, ignoring the tie-break setting."),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let query = matches
        .get_one::<String>("query")
        .cloned()
        .ok_or_else(|| CliError::new("missing query", ExitStatus::Usage))?;

    session.rebuild()?;
    let found = session.engine.suggestions(&query, ());
    let suggestions = if matches.get_flag("all") {
        found
    } else {
        session.engine.settings().tie_break.apply(found)
    };

    Ok(CommandResult::Suggestions { query, suggestions })
}
