use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use parking_lot::Mutex;

use crate::error::AutolinkError;
use crate::vault::vault_relative_path;

/// A document that can contribute link destinations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusDocument {
    /// Vault-relative path, used verbatim as the link path.
    pub path: String,
    /// Whether this is the document currently open for editing.
    pub is_live: bool,
    /// In-memory content that takes precedence over anything persisted.
    pub content: Option<String>,
}

impl CorpusDocument {
    /// A document whose content must be read through [`Corpus::read`].
    pub fn persisted(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_live: false,
            content: None,
        }
    }

    /// A document whose content is already in memory.
    pub fn loaded(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_live: false,
            content: Some(content.into()),
        }
    }

    /// The document open in the editor, with its unsaved content.
    pub fn live(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_live: true,
            content: Some(content.into()),
        }
    }

    /// File name without its extension; the document's own link term.
    pub fn basename(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("")
    }
}

/// Source of the documents an index is built from.
pub trait Corpus: Send + Sync {
    fn documents(&self) -> Result<Vec<CorpusDocument>, AutolinkError>;

    /// Persisted content of `document`.
    fn read(&self, document: &CorpusDocument) -> Result<String, AutolinkError>;
}

impl<C: Corpus + ?Sized> Corpus for Arc<C> {
    fn documents(&self) -> Result<Vec<CorpusDocument>, AutolinkError> {
        (**self).documents()
    }

    fn read(&self, document: &CorpusDocument) -> Result<String, AutolinkError> {
        (**self).read(document)
    }
}

/// Corpus held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryCorpus {
    documents: Mutex<BTreeMap<String, String>>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents<I, P, C>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let corpus = Self::new();
        for (path, content) in documents {
            corpus.insert(path, content);
        }
        corpus
    }

    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.documents.lock().insert(path.into(), content.into());
    }

    pub fn remove(&self, path: &str) -> Option<String> {
        self.documents.lock().remove(path)
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

impl Corpus for InMemoryCorpus {
    fn documents(&self) -> Result<Vec<CorpusDocument>, AutolinkError> {
        Ok(self
            .documents
            .lock()
            .keys()
            .map(|path| CorpusDocument::persisted(path.clone()))
            .collect())
    }

    fn read(&self, document: &CorpusDocument) -> Result<String, AutolinkError> {
        self.documents
            .lock()
            .get(&document.path)
            .cloned()
            .ok_or_else(|| AutolinkError::Corpus(format!("no document at {}", document.path)))
    }
}

/// Markdown files under a vault root on disk.
#[derive(Debug)]
pub struct FilesystemCorpus {
    root: PathBuf,
    live: Mutex<Option<(String, String)>>,
}

impl FilesystemCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            live: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Overlays unsaved editor content for the document at `path`.
    pub fn set_live_document(&self, path: impl Into<String>, content: impl Into<String>) {
        *self.live.lock() = Some((path.into(), content.into()));
    }

    pub fn clear_live_document(&self) {
        *self.live.lock() = None;
    }
}

impl Corpus for FilesystemCorpus {
    fn documents(&self) -> Result<Vec<CorpusDocument>, AutolinkError> {
        if !self.root.is_dir() {
            return Err(AutolinkError::Corpus(format!(
                "vault root {} is not a directory",
                self.root.display()
            )));
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .ignore(true)
            .git_ignore(true)
            .build();

        let mut paths = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable vault entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            if let Some(relative) = vault_relative_path(&self.root, path) {
                paths.push(relative);
            }
        }
        paths.sort();

        let live = self.live.lock().clone();
        Ok(paths
            .into_iter()
            .map(|path| match &live {
                Some((live_path, content)) if *live_path == path => {
                    CorpusDocument::live(path, content.clone())
                }
                _ => CorpusDocument::persisted(path),
            })
            .collect())
    }

    fn read(&self, document: &CorpusDocument) -> Result<String, AutolinkError> {
        let path = self.root.join(&document.path);
        fs::read_to_string(&path).map_err(|err| AutolinkError::from(err).context(path.display()))
    }
}
