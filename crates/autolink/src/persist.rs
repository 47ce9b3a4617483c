//! Crash-safe writes for vault files.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AutolinkError;

/// Sibling of `path` that a pending write is staged in.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replaces `path` with `contents` by staging a sibling file and renaming it into place.
///
/// An interrupted write leaves the previous contents untouched.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), AutolinkError> {
    let staged = staging_path(path);
    if let Err(err) = fs::write(&staged, contents) {
        let _ = fs::remove_file(&staged);
        return Err(AutolinkError::from(err).context(format!("failed to stage {}", staged.display())));
    }

    fs::rename(&staged, path).map_err(|err| {
        let _ = fs::remove_file(&staged);
        AutolinkError::from(err).context(format!("failed to replace {}", path.display()))
    })
}

pub(crate) fn write_atomic_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AutolinkError> {
    let payload = serde_json::to_string_pretty(value)?;
    write_atomic(path, &payload)
}
