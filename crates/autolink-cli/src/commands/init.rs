use std::env;
use std::path::PathBuf;

use autolink::vault;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands::CommandResult;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("init")
        .about("Initialize an autolink vault")
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .help("Vault root to initialize. Defaults to the current directory."),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Show the resolved vault root without writing to disk."),
        )
}

pub fn run(vault_override: Option<String>, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let positional = matches.get_one::<String>("path").cloned();
    let target = vault_override.or(positional).unwrap_or_else(|| ".".to_string());
    let dry_run = matches.get_flag("dry-run");

    let candidate = PathBuf::from(target);
    let root = if candidate.is_absolute() {
        candidate
    } else {
        env::current_dir()?.join(candidate)
    };

    let report = vault::init(&root, dry_run)?;
    Ok(CommandResult::VaultInitialized {
        root: report.paths.root().display().to_string(),
        settings: report.paths.settings_path().display().to_string(),
        created: report.created_settings,
        dry_run,
    })
}
