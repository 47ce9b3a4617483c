use std::path::PathBuf;
use std::sync::Arc;

use autolink::vault::{discover, discover_from_current_dir};
use autolink::{FilesystemCorpus, LinkEngine, RebuildOutcome, RebuildStats, VaultPaths};

use crate::error::{CliError, ExitStatus};
use crate::util::Verbosity;

pub struct CliSession {
    pub vault: VaultPaths,
    pub corpus: Arc<FilesystemCorpus>,
    pub engine: Arc<LinkEngine>,
    pub verbosity: Verbosity,
}

impl CliSession {
    pub fn bootstrap(vault_override: Option<String>, verbosity: Verbosity) -> Result<Self, CliError> {
        let vault = match vault_override {
            Some(path) => discover(PathBuf::from(path))?,
            None => discover_from_current_dir()?,
        };

        let settings = vault.load_settings()?;
        let corpus = Arc::new(FilesystemCorpus::new(vault.root()));
        let engine = Arc::new(LinkEngine::new(settings));

        Ok(Self {
            vault,
            corpus,
            engine,
            verbosity,
        })
    }

    /// Builds the index every query command runs against.
    pub fn rebuild(&self) -> Result<RebuildStats, CliError> {
        match self.engine.rebuild_index(self.corpus.as_ref())? {
            RebuildOutcome::Completed(stats) => Ok(stats),
            RebuildOutcome::Skipped => Err(CliError::new(
                "index rebuild was skipped while another rebuild was running",
                ExitStatus::Software,
            )),
        }
    }
}
