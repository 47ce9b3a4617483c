use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AutolinkError;
use crate::persist::write_atomic_json;
use crate::refresh::RefreshPolicy;
use crate::resolver::TieBreak;

/// User-facing switches, persisted as camelCase JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Offer suggestions while typing.
    pub use_suggestions: bool,
    /// Replace a matched term with a link as soon as it is completed.
    pub use_auto_link: bool,
    /// Read documents for aliases and block ids; file names are always indexed.
    pub search_file_content: bool,
    /// Highlight linkable spans in the visible text.
    pub real_time_linking: bool,
    pub auto_refresh_links: RefreshPolicy,
    /// Stem each word before indexing and querying.
    pub lemmatize_terms: bool,
    pub tie_break: TieBreak,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_suggestions: false,
            use_auto_link: false,
            search_file_content: true,
            real_time_linking: true,
            auto_refresh_links: RefreshPolicy::default(),
            lemmatize_terms: true,
            tie_break: TieBreak::default(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AutolinkError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|err| {
            AutolinkError::Serialization(format!("invalid settings {}: {err}", path.display()))
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), AutolinkError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        write_atomic_json(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_a_fresh_install() {
        let settings = Settings::default();
        assert!(!settings.use_suggestions);
        assert!(!settings.use_auto_link);
        assert!(settings.search_file_content);
        assert!(settings.real_time_linking);
        assert!(settings.lemmatize_terms);
        assert_eq!(settings.auto_refresh_links, RefreshPolicy::Always);
        assert_eq!(settings.tie_break, TieBreak::First);
    }

    #[test]
    fn partial_json_fills_defaults_and_ignores_unknown_fields() {
        let settings: Settings = serde_json::from_str(
            r#"{"useAutoLink": true, "autoRefreshLinks": "main", "somethingElse": 3}"#,
        )
        .unwrap();
        assert!(settings.use_auto_link);
        assert_eq!(settings.auto_refresh_links, RefreshPolicy::OnStructuralChange);
        assert!(settings.search_file_content);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(".autolink").join("settings.json");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());

        let settings = Settings {
            lemmatize_terms: false,
            tie_break: TieBreak::ShortestPath,
            ..Settings::default()
        };
        settings.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"lemmatizeTerms\": false"));
        assert!(raw.contains("\"tieBreak\": \"shortest-path\""));
        assert_eq!(Settings::load(&path).unwrap(), settings);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn invalid_json_is_a_serialization_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(AutolinkError::Serialization(_))
        ));
    }
}
