use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AutolinkError;
use crate::persist::write_atomic_json;
use crate::settings::Settings;

/// Name of the directory that marks a vault root.
pub const DOT_DIR: &str = ".autolink";

/// File holding the vault's settings inside [`DOT_DIR`].
pub const SETTINGS_FILE: &str = "settings.json";

/// Canonical paths for an autolink vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultPaths {
    root: PathBuf,
    dot_dir: PathBuf,
}

impl VaultPaths {
    /// Paths for a vault rooted at `root`, whether or not it has been initialized.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dot_dir = root.join(DOT_DIR);
        Self { root, dot_dir }
    }

    /// Returns the vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.autolink` folder for this vault.
    pub fn dot_dir(&self) -> &Path {
        &self.dot_dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dot_dir.join(SETTINGS_FILE)
    }

    pub fn load_settings(&self) -> Result<Settings, AutolinkError> {
        Settings::load(&self.settings_path())
    }

    /// Resolves `path` against the vault root when it is relative.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Vault-relative, forward-slash form of `path`, the shape link paths use.
    pub fn link_path(&self, path: impl AsRef<Path>) -> Result<String, AutolinkError> {
        let absolute = self.resolve(path);
        let canonical = fs::canonicalize(&absolute)
            .map_err(|err| AutolinkError::from(err).context(absolute.display()))?;
        vault_relative_path(&self.root, &canonical).ok_or_else(|| {
            AutolinkError::Vault(format!(
                "{} is outside the vault {}",
                canonical.display(),
                self.root.display()
            ))
        })
    }
}

/// Finds the vault containing `start`: a note, a folder, or a path not created yet.
pub fn discover(start: impl AsRef<Path>) -> Result<VaultPaths, AutolinkError> {
    let from = search_origin(start.as_ref())?;
    from.ancestors()
        .find(|dir| dir.join(DOT_DIR).is_dir())
        .map(|root| VaultPaths::at(root.to_path_buf()))
        .ok_or_else(|| {
            AutolinkError::Vault(format!("no {DOT_DIR} directory found from {}", from.display()))
        })
}

/// Discovers the vault enclosing the current directory.
pub fn discover_from_current_dir() -> Result<VaultPaths, AutolinkError> {
    discover(env::current_dir()?)
}

/// What [`init`] did, or would do under `dry_run`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitReport {
    pub paths: VaultPaths,
    pub created_dot_dir: bool,
    pub created_settings: bool,
}

/// Marks `root` as a vault and writes default settings when none exist.
///
/// A missing `root` is created. Refuses to nest a vault inside another one.
pub fn init(root: impl AsRef<Path>, dry_run: bool) -> Result<InitReport, AutolinkError> {
    let root = root.as_ref();
    if root.exists() && !root.is_dir() {
        return Err(AutolinkError::Vault(format!(
            "vault root {} is not a directory",
            root.display()
        )));
    }

    // Without its own marker, any vault discovered from `root` is an ancestor.
    if !root.join(DOT_DIR).is_dir() {
        if let Ok(existing) = discover(root) {
            return Err(AutolinkError::Vault(format!(
                "cannot initialize vault at {}; ancestor vault already exists at {}",
                root.display(),
                existing.root().display()
            )));
        }
    }

    if !dry_run {
        fs::create_dir_all(root)?;
    }
    let root = if root.exists() {
        fs::canonicalize(root)?
    } else {
        root.to_path_buf()
    };
    let paths = VaultPaths::at(root);

    let created_dot_dir = !paths.dot_dir().is_dir();
    let created_settings = !paths.settings_path().is_file();

    if !dry_run {
        if created_dot_dir {
            fs::create_dir_all(paths.dot_dir())?;
        }
        if created_settings {
            write_atomic_json(&paths.settings_path(), &Settings::default())?;
        }
    }

    Ok(InitReport {
        paths,
        created_dot_dir,
        created_settings,
    })
}

pub fn vault_relative_path(root: &Path, absolute: &Path) -> Option<String> {
    let relative = absolute.strip_prefix(root).ok()?;
    Some(relative.to_string_lossy().replace('\\', "/"))
}

/// Canonical folder a vault search begins in.
///
/// Missing trailing components are ignored so unsaved notes resolve; a note resolves to
/// the folder holding it.
fn search_origin(start: &Path) -> Result<PathBuf, AutolinkError> {
    let existing = start
        .ancestors()
        .find(|candidate| candidate.exists())
        .ok_or_else(|| AutolinkError::Vault(format!("no part of {} exists", start.display())))?;
    let canonical =
        fs::canonicalize(existing).map_err(|err| AutolinkError::from(err).context(existing.display()))?;

    if canonical.is_dir() {
        return Ok(canonical);
    }
    canonical.parent().map(Path::to_path_buf).ok_or_else(|| {
        AutolinkError::Vault(format!("{} has no parent folder", canonical.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discover_locates_nearest_vault() {
        let temp = tempdir().unwrap();
        let vault_root = temp.path().join("notes");
        fs::create_dir_all(vault_root.join(DOT_DIR)).unwrap();
        fs::create_dir_all(vault_root.join("biology").join("cells")).unwrap();

        let nested = vault_root.join("biology").join("cells");
        let paths = discover(&nested).expect("vault should be discovered");

        let expected_root = vault_root.canonicalize().unwrap();
        assert_eq!(paths.root(), expected_root.as_path());
        assert_eq!(paths.dot_dir(), expected_root.join(DOT_DIR).as_path());
    }

    #[test]
    fn discover_starts_from_missing_file_paths() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join(DOT_DIR)).unwrap();

        let paths = discover(temp.path().join("drafts").join("new.md")).unwrap();
        assert_eq!(paths.root(), temp.path().canonicalize().unwrap().as_path());
    }

    #[test]
    fn discover_from_a_note_searches_its_folder() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join(DOT_DIR)).unwrap();
        fs::create_dir_all(temp.path().join("biology")).unwrap();
        fs::write(temp.path().join("biology").join("Cell.md"), "cell").unwrap();

        let paths = discover(temp.path().join("biology").join("Cell.md")).unwrap();
        assert_eq!(paths.root(), temp.path().canonicalize().unwrap().as_path());
        assert_eq!(paths.settings_path(), paths.dot_dir().join(SETTINGS_FILE));
    }

    #[test]
    fn discover_errors_when_dot_dir_missing() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("orphaned");
        fs::create_dir_all(&root).unwrap();

        let err = discover(&root).expect_err("expected vault error");
        assert!(matches!(err, AutolinkError::Vault(_)));
    }

    #[test]
    fn init_writes_default_settings_once() {
        let temp = tempdir().unwrap();

        let dry = init(temp.path(), true).unwrap();
        assert!(dry.created_dot_dir && dry.created_settings);
        assert!(!temp.path().join(DOT_DIR).exists());

        let report = init(temp.path(), false).unwrap();
        assert!(report.created_settings);
        assert_eq!(report.paths.load_settings().unwrap(), Settings::default());

        let again = init(temp.path(), false).unwrap();
        assert!(!again.created_dot_dir);
        assert!(!again.created_settings);
    }

    #[test]
    fn init_creates_missing_roots_but_refuses_nesting() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("fresh").join("vault");

        let dry = init(&root, true).unwrap();
        assert!(dry.created_settings);
        assert!(!root.exists());

        init(&root, false).unwrap();
        assert!(root.join(DOT_DIR).join(SETTINGS_FILE).is_file());

        let err = init(root.join("nested"), false).unwrap_err();
        assert!(matches!(err, AutolinkError::Vault(msg) if msg.contains("ancestor vault")));
        assert!(!root.join("nested").exists());
    }

    #[test]
    fn link_paths_are_vault_relative_with_forward_slashes() {
        let temp = tempdir().unwrap();
        let report = init(temp.path(), false).unwrap();
        fs::create_dir_all(temp.path().join("biology")).unwrap();
        fs::write(temp.path().join("biology").join("Cell.md"), "cell").unwrap();

        let link = report.paths.link_path("biology/Cell.md").unwrap();
        assert_eq!(link, "biology/Cell.md");

        let outside = tempdir().unwrap();
        fs::write(outside.path().join("x.md"), "x").unwrap();
        let err = report
            .paths
            .link_path(outside.path().join("x.md"))
            .unwrap_err();
        assert!(matches!(err, AutolinkError::Vault(_)));
    }
}
