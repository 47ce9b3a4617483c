use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::Verbosity;

const NAME: &str = "autolink";

pub fn run() -> ExitCode {
    init_tracing();
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses arguments, resolves the vault and dispatches to a command.
///
/// Returns a `sysexits`-compatible `ExitCode` so scripts can react to failures.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let vault_override = matches.get_one::<String>("vault").cloned();

    // `init` runs before a vault exists, so it cannot go through the session.
    if let Some(("init", sub)) = matches.subcommand() {
        let result = commands::init::run(vault_override, sub)?;
        return emit_result(result, output);
    }

    let session = CliSession::bootstrap(vault_override, verbosity)?;
    if session.verbosity.verbose {
        tracing::info!(
            vault = %session.vault.root().display(),
            settings = %session.vault.settings_path().display(),
            lemmatize_terms = session.engine.settings().lemmatize_terms,
            "resolved vault context"
        );
    }

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    Command::new(NAME)
        .about("Link terms in a Markdown vault to the notes that define them")
        .arg(
            Arg::new("vault")
                .long("vault")
                .value_name("PATH")
                .global(true)
                .help("Specify the vault root. Defaults to the nearest ancestor with a .autolink folder."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit newline-delimited JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log the resolved vault and settings before running the command."),
        )
        .subcommand_required(true)
        .subcommand(commands::init::command())
        .subcommand(commands::index::command())
        .subcommand(commands::suggest::command())
        .subcommand(commands::scan::command())
        .subcommand(commands::link::command())
        .subcommand(commands::backlinks::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("index", sub)) => commands::index::run(session, sub),
        Some(("suggest", sub)) => commands::suggest::run(session, sub),
        Some(("scan", sub)) => commands::scan::run(session, sub),
        Some(("link", sub)) => commands::link::run(session, sub),
        Some(("backlinks", sub)) => commands::backlinks::run(session, sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}
