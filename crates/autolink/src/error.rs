use std::fmt;

use thiserror::Error;

/// High-level error type shared across autolink components.
#[derive(Debug, Error)]
pub enum AutolinkError {
    #[error("front matter error: {0}")]
    FrontMatter(String),
    #[error("corpus error: {0}")]
    Corpus(String),
    #[error("vault error: {0}")]
    Vault(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for AutolinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AutolinkError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::FrontMatter(err.to_string())
    }
}

impl AutolinkError {
    pub fn context<T: fmt::Display>(self, ctx: T) -> Self {
        match self {
            AutolinkError::FrontMatter(msg) => AutolinkError::FrontMatter(format!("{ctx}: {msg}")),
            AutolinkError::Corpus(msg) => AutolinkError::Corpus(format!("{ctx}: {msg}")),
            AutolinkError::Vault(msg) => AutolinkError::Vault(format!("{ctx}: {msg}")),
            AutolinkError::Serialization(msg) => {
                AutolinkError::Serialization(format!("{ctx}: {msg}"))
            }
            AutolinkError::Io(err) => {
                AutolinkError::Io(std::io::Error::new(err.kind(), format!("{ctx}: {err}")))
            }
        }
    }
}
