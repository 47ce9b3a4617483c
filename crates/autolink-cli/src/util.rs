use std::env;
use std::path::PathBuf;

use autolink::VaultPaths;

use crate::error::{CliError, ExitStatus};

#[derive(Clone, Copy, Debug, Default)]
pub struct Verbosity {
    pub json: bool,
    pub verbose: bool,
}

/// A vault document named on the command line.
pub struct DocumentArg {
    pub absolute: PathBuf,
    /// Vault-relative path, the document's link path.
    pub link_path: String,
}

/// Resolves `raw` against the current directory, falling back to the vault root.
pub fn resolve_document(vault: &VaultPaths, raw: &str) -> Result<DocumentArg, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::new("document path must not be empty", ExitStatus::Usage));
    }

    let candidate = PathBuf::from(trimmed);
    let absolute = if candidate.is_absolute() {
        candidate
    } else {
        let from_cwd = env::current_dir()?.join(&candidate);
        if from_cwd.is_file() {
            from_cwd
        } else {
            vault.root().join(&candidate)
        }
    };

    if !absolute.is_file() {
        return Err(CliError::new(
            format!("document {trimmed} not found"),
            ExitStatus::Usage,
        ));
    }

    let link_path = vault.link_path(&absolute)?;
    Ok(DocumentArg {
        absolute,
        link_path,
    })
}
