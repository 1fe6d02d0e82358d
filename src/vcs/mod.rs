//! Per-file churn from local git history.
//!
//! One revwalk from HEAD (newest first, capped at `max_commits`) diffs every
//! commit against its first parent and accumulates additions, deletions,
//! authors and the oldest touching commit per path.

use crate::errors::Result;
use chrono::{DateTime, TimeZone, Utc};
use git2::{Repository, Sort};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct FileHistory {
    pub commit_count: usize,
    pub authors: HashSet<String>,
    pub first_seen: Option<DateTime<Utc>>,
    pub lines_added: usize,
    pub lines_deleted: usize,
}

/// The VCS columns of a feature row
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VcsFeatures {
    pub commit_count: f64,
    pub distinct_authors: f64,
    pub file_age_days: f64,
    pub lines_added: f64,
    pub lines_deleted: f64,
}

#[derive(Debug)]
pub struct VcsHistory {
    workdir: PathBuf,
    files: HashMap<PathBuf, FileHistory>,
    now: DateTime<Utc>,
    commits_walked: usize,
}

impl VcsHistory {
    /// Walk the repository containing `path`. Returns `Ok(None)` when `path`
    /// is not inside a non-bare repository with at least one commit, or when
    /// that repository does not track `path` at HEAD (an extracted copy
    /// under someone else's checkout).
    pub fn collect(path: &Path, max_commits: usize) -> Result<Option<Self>> {
        let repo = match Repository::discover(path) {
            Ok(repo) => repo,
            Err(e) => {
                log::debug!("No git repository at {}: {}", path.display(), e.message());
                return Ok(None);
            }
        };
        let Some(workdir) = repo.workdir() else {
            log::debug!("Bare repository at {}, skipping history", path.display());
            return Ok(None);
        };
        let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());

        if repo.head().is_err() {
            log::debug!("Repository at {} has no commits", workdir.display());
            return Ok(None);
        }

        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Ok(relative) = root.strip_prefix(&workdir) {
            if !relative.as_os_str().is_empty() && !tracked_at_head(&repo, relative) {
                log::debug!(
                    "{} is not tracked by the repository at {}, skipping history",
                    root.display(),
                    workdir.display()
                );
                return Ok(None);
            }
        }

        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TIME)?;

        let mut files: HashMap<PathBuf, FileHistory> = HashMap::new();
        let mut commits_walked = 0;

        for oid in revwalk.filter_map(|oid| oid.ok()).take(max_commits) {
            let commit = repo.find_commit(oid)?;
            accumulate_commit(&repo, &commit, &mut files)?;
            commits_walked += 1;
        }

        log::info!(
            "Collected history for {} files from {} commits",
            files.len(),
            commits_walked
        );

        Ok(Some(Self {
            workdir,
            files,
            now: Utc::now(),
            commits_walked,
        }))
    }

    pub fn commits_walked(&self) -> usize {
        self.commits_walked
    }

    /// History for an absolute or working-directory-relative path
    pub fn file(&self, path: &Path) -> Option<&FileHistory> {
        self.files.get(&self.relative(path)?)
    }

    /// Feature values for `path`; files without history get zeros
    pub fn features(&self, path: &Path) -> VcsFeatures {
        let Some(history) = self.file(path) else {
            return VcsFeatures::default();
        };
        let age_days = history
            .first_seen
            .map(|first| self.now.signed_duration_since(first).num_days().max(0))
            .unwrap_or(0);

        VcsFeatures {
            commit_count: history.commit_count as f64,
            distinct_authors: history.authors.len() as f64,
            file_age_days: age_days as f64,
            lines_added: history.lines_added as f64,
            lines_deleted: history.lines_deleted as f64,
        }
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        if path.is_relative() {
            return Some(path.to_path_buf());
        }
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        canonical
            .strip_prefix(&self.workdir)
            .ok()
            .map(Path::to_path_buf)
    }
}

fn accumulate_commit(
    repo: &Repository,
    commit: &git2::Commit<'_>,
    files: &mut HashMap<PathBuf, FileHistory>,
) -> Result<()> {
    let parent_tree = commit.parents().next().and_then(|p| p.tree().ok());
    let tree = commit.tree()?;
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

    let mut line_stats: HashMap<PathBuf, (usize, usize)> = HashMap::new();
    for delta in diff.deltas() {
        if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
            line_stats.entry(path.to_path_buf()).or_insert((0, 0));
        }
    }

    diff.foreach(
        &mut |_, _| true,
        None,
        None,
        Some(&mut |delta, _hunk, line| {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                let entry = line_stats.entry(path.to_path_buf()).or_insert((0, 0));
                match line.origin() {
                    '+' => entry.0 += 1,
                    '-' => entry.1 += 1,
                    _ => {}
                }
            }
            true
        }),
    )?;

    let signature = commit.author();
    let author = signature
        .email()
        .or_else(|| signature.name())
        .unwrap_or("unknown")
        .to_string();
    let date = Utc.timestamp_opt(commit.time().seconds(), 0).single();

    for (path, (added, deleted)) in line_stats {
        let history = files.entry(path).or_default();
        history.commit_count += 1;
        history.authors.insert(author.clone());
        history.lines_added += added;
        history.lines_deleted += deleted;
        // walk is newest first, so the last date seen is the oldest
        if date.is_some() {
            history.first_seen = date;
        }
    }
    Ok(())
}

fn tracked_at_head(repo: &Repository, relative: &Path) -> bool {
    repo.head()
        .and_then(|head| head.peel_to_tree())
        .is_ok_and(|tree| tree.get_path(relative).is_ok())
}
