use clap::{ArgMatches, Command};
use serde::Serialize;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct BucketSummary {
    pub num_terms: usize,
    pub destinations: usize,
}

pub fn command() -> Command {
    Command::new("index").about("Rebuild the link index and report what it contains")
}

pub fn run(session: &CliSession, _matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let stats = session.rebuild()?;
    let index = session.engine.snapshot();
    let buckets = index
        .ranges()
        .iter()
        .map(|(num_terms, range)| BucketSummary {
            num_terms: *num_terms,
            destinations: range.end - range.start + 1,
        })
        .collect();

    Ok(CommandResult::IndexRebuilt { stats, buckets })
}
