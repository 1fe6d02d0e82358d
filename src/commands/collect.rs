use super::{print_summary, CommandContext};
use crate::collect::{clear_run_directory, ClearOutcome, RepoList, SourceExtractor};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct ExtractSummary {
    run_dir: PathBuf,
    repositories: usize,
    missing: Vec<PathBuf>,
    files: usize,
}

/// Checkouts named by `--repo-list`, resolved under `checkouts`
fn listed_checkouts(list: &Path, checkouts: &Path) -> Result<Vec<PathBuf>> {
    let repos = RepoList::load(list)
        .with_context(|| format!("Failed to read repository list {}", list.display()))?;
    log::info!("Repository list names {} repositories", repos.len());
    Ok(repos
        .repos
        .iter()
        .map(|entry| entry.local_path(checkouts))
        .collect())
}

pub fn extract(
    context: &CommandContext,
    repo: Option<PathBuf>,
    repo_list: Option<PathBuf>,
    checkouts: Option<PathBuf>,
    run_dir: &Path,
) -> Result<()> {
    let repos = match (repo, repo_list, checkouts) {
        (_, Some(list), Some(checkouts)) => listed_checkouts(&list, &checkouts)?,
        (Some(repo), _, _) => vec![repo],
        _ => anyhow::bail!("Give a checkout path or --repo-list with --checkouts"),
    };

    let extractor = SourceExtractor::new(context.config.languages());
    let mut summary = ExtractSummary {
        run_dir: run_dir.to_path_buf(),
        repositories: 0,
        missing: Vec::new(),
        files: 0,
    };
    for repo in repos {
        if !repo.is_dir() {
            log::warn!("Checkout {} not found, skipping", repo.display());
            summary.missing.push(repo);
            continue;
        }
        let copied = extractor
            .extract_to(&repo, run_dir)
            .with_context(|| format!("Failed to extract {}", repo.display()))?;
        summary.repositories += 1;
        summary.files += copied.len();
    }

    let lines = vec![
        format!(
            "Extracted {} files from {} repositories into {}",
            summary.files,
            summary.repositories,
            run_dir.display()
        ),
        format!("Missing checkouts: {}", summary.missing.len()),
    ];
    print_summary(context.format, &summary, &lines)
}

pub fn prune(context: &CommandContext, repo: &Path, execute: bool) -> Result<()> {
    let report = SourceExtractor::new(context.config.languages())
        .prune(repo, execute)
        .with_context(|| format!("Failed to prune {}", repo.display()))?;

    let mut lines = vec![
        format!("Repository: {}", report.repo.display()),
        format!("Files kept: {}", report.files_kept),
        format!(
            "Files marked for deletion: {}",
            report.files_marked_for_deletion
        ),
    ];
    lines.extend(
        report
            .to_delete_examples
            .iter()
            .map(|p| format!("  - {}", p.display())),
    );
    match (report.files_deleted, report.dirs_removed) {
        (Some(files), Some(dirs)) => {
            lines.push(format!("Deleted {files} files and {dirs} empty directories"))
        }
        _ => lines.push("Dry run: nothing deleted (use --execute to delete)".to_string()),
    }
    print_summary(context.format, &report, &lines)
}

pub fn clear(context: &CommandContext, run_dir: &Path) -> Result<()> {
    let outcome = clear_run_directory(run_dir)
        .with_context(|| format!("Failed to clear {}", run_dir.display()))?;
    let line = match outcome {
        ClearOutcome::Missing => format!("{} does not exist", run_dir.display()),
        ClearOutcome::Cleared { removed } => {
            format!("Removed {removed} entries from {}", run_dir.display())
        }
    };
    print_summary(context.format, &outcome, &[line])
}
