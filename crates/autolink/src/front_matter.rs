use serde::Deserialize;

use crate::error::AutolinkError;

/// The part of a note's YAML front matter the index cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteFrontMatter {
    #[serde(default)]
    pub aliases: Option<AliasList>,
}

/// `aliases` may be written as a list or as a single scalar.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AliasList {
    One(String),
    Many(Vec<Option<String>>),
}

impl AliasList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            AliasList::One(alias) => vec![alias],
            AliasList::Many(aliases) => aliases.into_iter().flatten().collect(),
        }
    }
}

/// A note's leading YAML block and the body that follows it.
pub struct FrontMatterSplit<'a> {
    pub yaml: &'a str,
    pub body: &'a str,
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Splits off the `---` fenced YAML block a note may open with.
///
/// `None` when the first line is not a fence or the block is never closed; such notes
/// are all body.
pub fn split_front_matter(content: &str) -> Option<FrontMatterSplit<'_>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let opening = lines.next()?;
    if !is_fence(opening) {
        return None;
    }

    let yaml_start = opening.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            return Some(FrontMatterSplit {
                yaml: content[yaml_start..offset].trim_end(),
                body: &content[offset + line.len()..],
            });
        }
        offset += line.len();
    }
    None
}

/// Body of the document with any leading front matter removed.
pub fn body_after_front_matter(content: &str) -> &str {
    split_front_matter(content).map_or(content, |split| split.body)
}

/// Parses the `aliases` of a document's front matter.
///
/// A document without front matter yields `Ok(vec![])`; unparseable YAML is an error the
/// caller is expected to downgrade.
pub fn parse_aliases(content: &str) -> Result<Vec<String>, AutolinkError> {
    let Some(split) = split_front_matter(content) else {
        return Ok(Vec::new());
    };
    if split.yaml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let front: Option<NoteFrontMatter> = serde_yaml::from_str(split.yaml)?;
    Ok(front
        .and_then(|front| front.aliases)
        .map(AliasList::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter(|alias| !alias.trim().is_empty())
        .collect())
}

/// Like [`parse_aliases`], treating malformed front matter as "no aliases".
pub fn aliases_or_empty(content: &str, path: &str) -> Vec<String> {
    match parse_aliases(content) {
        Ok(aliases) => aliases,
        Err(err) => {
            tracing::debug!(path, error = %err, "ignoring malformed front matter");
            Vec::new()
        }
    }
}
