//! Reduce a local checkout to its analyzable sources.
//!
//! Nothing inside `.git/` is visited, and git metadata files next to the
//! sources (`.gitignore`, `.gitattributes`, ...) are never deleted.

use crate::core::Language;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const EXAMPLE_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PruneReport {
    pub repo: PathBuf,
    pub files_kept: usize,
    pub files_marked_for_deletion: usize,
    pub kept_examples: Vec<PathBuf>,
    pub to_delete_examples: Vec<PathBuf>,
    pub git_related_ignored: Vec<PathBuf>,
    /// Set only when the prune was executed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_deleted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirs_removed: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClearOutcome {
    Missing,
    Cleared { removed: usize },
}

/// Files of one checkout, split by what pruning would do with them
#[derive(Debug, Default)]
struct Classification {
    kept: Vec<PathBuf>,
    to_delete: Vec<PathBuf>,
    git_related: Vec<PathBuf>,
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == std::ffi::OsStr::new(".git")
}

fn is_git_related(name: &str) -> bool {
    name.starts_with(".git")
}

pub struct SourceExtractor {
    languages: Vec<Language>,
}

impl Default for SourceExtractor {
    fn default() -> Self {
        Self::new(Language::SUPPORTED.to_vec())
    }
}

impl SourceExtractor {
    pub fn new(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    fn keeps(&self, path: &Path) -> bool {
        let language = Language::from_path(path);
        language != Language::Unknown && self.languages.contains(&language)
    }

    fn classify(&self, repo: &Path) -> Result<Classification> {
        let mut classification = Classification::default();
        for entry in WalkDir::new(repo)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_git_dir(e))
        {
            let entry = entry.map_err(|e| Error::FileSystem {
                message: format!("walking {}: {e}", repo.display()),
                path: Some(repo.to_path_buf()),
                source: None,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path().to_path_buf();
            let name = entry.file_name().to_string_lossy();
            if is_git_related(&name) {
                classification.git_related.push(path);
            } else if self.keeps(&path) {
                classification.kept.push(path);
            } else {
                classification.to_delete.push(path);
            }
        }
        Ok(classification)
    }

    /// Delete every non-source file of `repo`. A dry run (`execute == false`)
    /// only reports what would go.
    pub fn prune(&self, repo: &Path, execute: bool) -> Result<PruneReport> {
        if !repo.is_dir() {
            return Err(Error::file_system(
                format!("{} is not a directory", repo.display()),
                repo,
            ));
        }
        let classification = self.classify(repo)?;

        let mut report = PruneReport {
            repo: repo.to_path_buf(),
            files_kept: classification.kept.len(),
            files_marked_for_deletion: classification.to_delete.len(),
            kept_examples: examples(&classification.kept),
            to_delete_examples: examples(&classification.to_delete),
            git_related_ignored: examples(&classification.git_related),
            files_deleted: None,
            dirs_removed: None,
        };

        if execute {
            let mut deleted = 0;
            for path in &classification.to_delete {
                match fs::remove_file(path) {
                    Ok(()) => deleted += 1,
                    Err(e) => log::warn!("Failed to delete {}: {}", path.display(), e),
                }
            }
            report.files_deleted = Some(deleted);
            report.dirs_removed = Some(remove_empty_dirs(repo));
            log::info!(
                "Pruned {}: kept {}, deleted {} files and {} directories",
                repo.display(),
                report.files_kept,
                deleted,
                report.dirs_removed.unwrap_or(0)
            );
        }
        Ok(report)
    }

    /// Copy the kept files of `repo` into `run_dir/<repo name>/`, keeping
    /// their relative layout. Returns the copied paths relative to `repo`.
    pub fn extract_to(&self, repo: &Path, run_dir: &Path) -> Result<Vec<PathBuf>> {
        if !repo.is_dir() {
            return Err(Error::file_system(
                format!("{} is not a directory", repo.display()),
                repo,
            ));
        }
        let destination = extraction_root(repo, run_dir)?;

        let classification = self.classify(repo)?;
        let mut copied = Vec::with_capacity(classification.kept.len());
        for source in classification.kept {
            let relative = source.strip_prefix(repo).unwrap_or(&source).to_path_buf();
            let target = destination.join(&relative);
            if let Some(parent) = target.parent() {
                crate::io::ensure_dir(parent)?;
            }
            fs::copy(&source, &target).map_err(|e| Error::io_at(&source, e))?;
            copied.push(relative);
        }
        log::info!(
            "Extracted {} source files into {}",
            copied.len(),
            destination.display()
        );
        Ok(copied)
    }
}

/// `run_dir/<repo name>`, where the name is the last component of the
/// canonical repo path so `.` extracts under the checkout's own name
pub fn extraction_root(repo: &Path, run_dir: &Path) -> Result<PathBuf> {
    let name = repo
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_os_string()))
        .ok_or_else(|| Error::file_system("cannot determine repository name", repo))?;
    Ok(run_dir.join(name))
}

fn examples(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().take(EXAMPLE_LIMIT).cloned().collect()
}

/// Remove empty directories below `root`, deepest first. `root` itself and
/// anything under `.git` stay.
fn remove_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;
    let mut dirs: Vec<(usize, PathBuf)> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_git_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| (e.depth(), e.into_path()))
        .collect();
    dirs.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, dir) in dirs {
        let empty = fs::read_dir(&dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if empty && fs::remove_dir(&dir).is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Empty `run_dir` without removing it
pub fn clear_run_directory(run_dir: &Path) -> Result<ClearOutcome> {
    if !run_dir.exists() {
        return Ok(ClearOutcome::Missing);
    }
    let mut removed = 0;
    for entry in fs::read_dir(run_dir).map_err(|e| Error::io_at(run_dir, e))? {
        let path = entry.map_err(|e| Error::io_at(run_dir, e))?.path();
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| Error::io_at(&path, e))?;
        removed += 1;
    }
    Ok(ClearOutcome::Cleared { removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn checkout() -> TempDir {
        let dir = TempDir::new().unwrap();
        let files = [
            "src/app.py",
            "src/native/fast.cpp",
            "docs/guide.md",
            "docs/img/logo.png",
            ".gitignore",
            ".git/config",
            ".git/objects/ab/cdef",
            "Main.java",
        ];
        for rel in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        dir
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let repo = checkout();
        let report = SourceExtractor::default().prune(repo.path(), false).unwrap();

        assert_eq!(report.files_kept, 3);
        assert_eq!(report.files_marked_for_deletion, 2);
        assert_eq!(report.git_related_ignored, vec![repo.path().join(".gitignore")]);
        assert!(report.files_deleted.is_none());
        assert!(repo.path().join("docs/guide.md").exists());
    }

    #[test]
    fn test_execute_prunes_and_removes_empty_dirs() {
        let repo = checkout();
        let report = SourceExtractor::default().prune(repo.path(), true).unwrap();

        assert_eq!(report.files_deleted, Some(2));
        // docs/img then docs
        assert_eq!(report.dirs_removed, Some(2));
        assert!(!repo.path().join("docs").exists());
        assert!(repo.path().join("src/app.py").exists());
        assert!(repo.path().join(".gitignore").exists());
        assert!(repo.path().join(".git/objects/ab/cdef").exists());
    }

    #[test]
    fn test_execute_leaves_git_dir_alone() {
        let repo = TempDir::new().unwrap();
        for rel in [".git/refs/tags", ".git/branches", "docs"] {
            fs::create_dir_all(repo.path().join(rel)).unwrap();
        }
        fs::write(repo.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(repo.path().join("docs/notes.md"), "notes").unwrap();
        fs::write(repo.path().join("app.py"), "x = 1\n").unwrap();

        let report = SourceExtractor::default().prune(repo.path(), true).unwrap();

        assert_eq!(report.files_deleted, Some(1));
        assert_eq!(report.dirs_removed, Some(1));
        assert!(!repo.path().join("docs").exists());
        assert!(repo.path().join(".git/refs/tags").is_dir());
        assert!(repo.path().join(".git/branches").is_dir());
        assert!(repo.path().join(".git/HEAD").exists());
        assert!(repo.path().join("app.py").exists());
    }

    #[test]
    fn test_extract_to_copies_sources() {
        let repo = checkout();
        let run = TempDir::new().unwrap();
        let copied = SourceExtractor::default()
            .extract_to(repo.path(), run.path())
            .unwrap();
        assert_eq!(copied.len(), 3);

        let name = repo.path().canonicalize().unwrap();
        let target = run.path().join(name.file_name().unwrap());
        assert!(target.join("src/native/fast.cpp").exists());
        assert!(!target.join("docs").exists());
        assert!(repo.path().join("docs/guide.md").exists());
    }

    #[test]
    fn test_clear_run_directory() {
        let run = TempDir::new().unwrap();
        let missing = run.path().join("missing");
        assert_eq!(clear_run_directory(&missing).unwrap(), ClearOutcome::Missing);

        fs::create_dir_all(run.path().join("repo/src")).unwrap();
        fs::write(run.path().join("stray.txt"), "x").unwrap();
        assert_eq!(
            clear_run_directory(run.path()).unwrap(),
            ClearOutcome::Cleared { removed: 2 }
        );
        assert!(run.path().exists());
        assert_eq!(fs::read_dir(run.path()).unwrap().count(), 0);
    }
}
