// Domain rules - Business logic and policies

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::model::*;

/// How a file name is tested against the recognized extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The name contains the extension anywhere (`song.mp3.txt` matches)
    #[default]
    Substring,
    /// The name ends with the extension, ignoring case
    Suffix,
}

/// Decides which files of a library are audio files worth probing
#[derive(Debug, Clone)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
    mode: MatchMode,
}

impl ExtensionMatcher {
    pub fn new(extensions: Vec<String>, mode: MatchMode) -> Self {
        Self { extensions, mode }
    }

    /// Check whether the file name of `path` is a recognized audio file
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };

        match self.mode {
            MatchMode::Substring => self.extensions.iter().any(|ext| name.contains(ext.as_str())),
            MatchMode::Suffix => {
                let lower = name.to_lowercase();
                self.extensions
                    .iter()
                    .any(|ext| lower.ends_with(&ext.to_lowercase()))
            }
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for ExtensionMatcher {
    fn default() -> Self {
        Self::new(default_extensions(), MatchMode::default())
    }
}

/// Extensions scanned when no configuration overrides them
pub fn default_extensions() -> Vec<String> {
    vec![".flac".to_string(), ".opus".to_string(), ".mp3".to_string()]
}

/// Derive the year field from a date tag
///
/// `2020-05-01` and `2020` both give `2020`; anything that does not start
/// with four digits is returned trimmed but otherwise untouched.
pub fn year_from_date(date: &str) -> String {
    let trimmed = date.trim();
    let leading: String = trimmed.chars().take(4).collect();
    let rest = &trimmed[leading.len()..];

    if leading.len() == 4
        && leading.chars().all(|c| c.is_ascii_digit())
        && !rest.starts_with(|c: char| c.is_ascii_digit())
    {
        leading
    } else {
        trimmed.to_string()
    }
}

/// What must be done to learn whether an explicit version exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplicitDecision {
    /// The looked-up recording is itself explicit
    AlreadyExplicit,
    /// A catalog search for an explicit counterpart is required
    SearchRequired(ExplicitSearch),
}

impl ExplicitDecision {
    pub fn for_record(record: &CatalogRecord) -> Self {
        if record.is_explicit() {
            ExplicitDecision::AlreadyExplicit
        } else {
            ExplicitDecision::SearchRequired(ExplicitSearch::from(record))
        }
    }
}

/// Scan a search result for any recording flagged explicit
pub fn any_explicit(recordings: &[serde_json::Value]) -> bool {
    recordings.iter().any(|rec| {
        rec.get("isExplicit")
            .map(|flag| catalog_string(flag) == EXPLICIT_MARKER)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests;
