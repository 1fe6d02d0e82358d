//! Code collection from local checkouts.
//!
//! Repository lists come from a metadata JSON file (for example a saved
//! search result). Cloning is left to the user; the checkouts are then
//! pruned or extracted into a run directory for analysis.

pub mod extractor;

pub use extractor::{
    clear_run_directory, extraction_root, ClearOutcome, PruneReport, SourceExtractor,
};

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoEntry {
    pub name: String,
    pub clone_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl RepoEntry {
    /// Where the checkout of this repository lives under `checkouts`
    pub fn local_path(&self, checkouts: &Path) -> PathBuf {
        checkouts.join(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RepoList {
    pub repos: Vec<RepoEntry>,
}

impl RepoList {
    /// Accepts either a JSON array of repository objects or an object whose
    /// values are repository objects. Entries without a `clone_url` string
    /// are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let value: Value = crate::io::read_json(path)?;
        Self::from_value(value)
            .map_err(|e| e.with_context(format!("reading repository list {}", path.display())))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let entries: Vec<Value> = match value {
            Value::Array(items) => items,
            Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
            _ => {
                return Err(Error::dataset(
                    "expected an array or an object of repositories",
                ))
            }
        };

        let mut skipped = 0;
        let repos: Vec<RepoEntry> = entries
            .iter()
            .filter_map(|entry| {
                let repo = entry_from_value(entry);
                if repo.is_none() {
                    skipped += 1;
                }
                repo
            })
            .collect();
        if skipped > 0 {
            log::debug!("Skipped {skipped} repository entries without a clone_url");
        }
        Ok(Self { repos })
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn clone_urls(&self) -> Vec<&str> {
        self.repos.iter().map(|r| r.clone_url.as_str()).collect()
    }
}

fn entry_from_value(entry: &Value) -> Option<RepoEntry> {
    let clone_url = entry.get("clone_url")?.as_str()?.to_string();
    Some(RepoEntry {
        name: repo_name_from_url(&clone_url),
        language: entry
            .get("language")
            .and_then(Value::as_str)
            .map(str::to_string),
        clone_url,
    })
}

/// `https://host/owner/project.git/` -> `project`
pub fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repo_name_from_url() {
        assert_eq!(repo_name_from_url("https://github.com/a/b.git"), "b");
        assert_eq!(repo_name_from_url("https://github.com/a/b/"), "b");
        assert_eq!(repo_name_from_url("git@github.com:a/tool.git"), "tool");
        assert_eq!(repo_name_from_url("plain"), "plain");
    }

    #[test]
    fn test_load_array_and_map() {
        let list = RepoList::from_value(json!([
            {"clone_url": "https://x/a/one.git", "language": "Python"},
            {"name": "no url"},
            {"clone_url": 5},
        ]))
        .unwrap();
        assert_eq!(list.clone_urls(), vec!["https://x/a/one.git"]);
        assert_eq!(list.repos[0].name, "one");
        assert_eq!(list.repos[0].language.as_deref(), Some("Python"));

        let list = RepoList::from_value(json!({
            "first": {"clone_url": "https://x/a/one.git"},
            "second": {"clone_url": "https://x/b/two.git"},
        }))
        .unwrap();
        assert_eq!(list.len(), 2);

        assert!(RepoList::from_value(json!("nope")).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, r#"[{"clone_url": "https://x/a/one.git"}]"#).unwrap();
        let list = RepoList::load(&path).unwrap();
        assert_eq!(
            list.repos[0].local_path(Path::new("checkouts")),
            PathBuf::from("checkouts/one")
        );
    }
}
