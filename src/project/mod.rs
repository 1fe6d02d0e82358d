//! Whole-directory analysis: discovery, per-file analysis in parallel, then
//! the metrics that need every file (imports, tests, history).

pub mod graph;
pub mod test_files;

use crate::analyzers::{analyze_file, get_analyzer_with_options};
use crate::config::SmellscopeConfig;
use crate::core::{FileAnalysis, Language};
use crate::errors::{Error, Result};
use crate::io::walker::FileWalker;
use crate::metrics::round_to;
use crate::observability::{self, Stage};
use crate::progress::{ProgressConfig, TEMPLATE_FILE_ANALYSIS};
use crate::vcs::VcsHistory;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use graph::{CouplingMetrics, ImportGraph};
pub use test_files::{is_test_file, TestIndex};

#[derive(Debug, Clone, Copy)]
pub struct ProjectOptions {
    pub parallel: bool,
    pub progress: ProgressConfig,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            progress: ProgressConfig { quiet_mode: true },
        }
    }
}

/// A file that could not be read or parsed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub root: PathBuf,
    pub scanned_files: usize,
    pub errors: usize,
    pub files: Vec<FileAnalysis>,
    pub failures: Vec<FileFailure>,
    pub vcs_available: bool,
}

pub fn analyze_project(root: &Path, config: &SmellscopeConfig) -> Result<ProjectAnalysis> {
    analyze_project_with(root, config, &ProjectOptions::default())
}

pub fn analyze_project_with(
    root: &Path,
    config: &SmellscopeConfig,
    options: &ProjectOptions,
) -> Result<ProjectAnalysis> {
    if !root.is_dir() {
        return Err(Error::file_system(
            format!("{} is not a directory", root.display()),
            root,
        ));
    }
    let root = root.canonicalize().map_err(|e| Error::io_at(root, e))?;

    let paths = {
        let _stage = observability::set_stage(Stage::FileDiscovery);
        FileWalker::new(root.clone())
            .with_languages(config.languages())
            .with_ignore_patterns(config.ignore.patterns.clone())
            .walk()?
    };
    log::info!("Discovered {} source files under {}", paths.len(), root.display());

    let results = analyze_paths(&root, &paths, config, options);

    let mut files = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(analysis) => files.push(analysis),
            Err(failure) => {
                log::warn!("Skipping {}: {}", failure.path.display(), failure.error);
                failures.push(failure);
            }
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let vcs_available = {
        let _stage = observability::set_stage(Stage::ProjectMetrics);
        apply_project_metrics(&root, &mut files, config)?
    };

    let analysis = ProjectAnalysis {
        root,
        scanned_files: paths.len(),
        errors: failures.len(),
        files,
        failures,
        vcs_available,
    };
    log::info!(
        "Analysis summary: scanned_files={} errors={}",
        analysis.scanned_files,
        analysis.errors
    );
    Ok(analysis)
}

fn analyze_paths(
    root: &Path,
    paths: &[PathBuf],
    config: &SmellscopeConfig,
    options: &ProjectOptions,
) -> Vec<std::result::Result<FileAnalysis, FileFailure>> {
    let _stage = observability::set_stage(Stage::Parsing);
    observability::set_progress(0, paths.len());
    let bar = options
        .progress
        .create_bar(paths.len() as u64, TEMPLATE_FILE_ANALYSIS, "Analyzing");
    let analysis_options = config.analysis_options();

    let analyze_one = |path: &PathBuf| {
        let _stage = observability::set_stage(Stage::Parsing);
        let _file = observability::set_current_file(path);
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        let analyzer =
            get_analyzer_with_options(Language::from_path(path), analysis_options.clone());
        let result = crate::io::read_file(path)
            .and_then(|content| analyze_file(&content, relative.clone(), analyzer.as_ref()))
            .map_err(|e| FileFailure {
                path: relative,
                error: e.to_string(),
            });
        observability::increment_processed();
        bar.inc(1);
        result
    };

    let results = if options.parallel {
        paths.par_iter().map(analyze_one).collect()
    } else {
        paths.iter().map(analyze_one).collect()
    };
    bar.finish_and_clear();
    results
}

/// Fill the columns that depend on the whole file set. Returns whether
/// version-control history was available.
fn apply_project_metrics(
    root: &Path,
    files: &mut [FileAnalysis],
    config: &SmellscopeConfig,
) -> Result<bool> {
    let coupling = ImportGraph::build(files).metrics();
    let tests = TestIndex::new(files.iter().map(|f| f.path.as_path()));

    let history = if config.vcs.enabled {
        VcsHistory::collect(root, config.vcs.max_commits)?
    } else {
        None
    };

    for (file, coupling) in files.iter_mut().zip(coupling) {
        file.is_test_file = is_test_file(&file.path);
        let features = &mut file.features;
        features.afferent_coupling = coupling.afferent as f64;
        features.efferent_coupling = coupling.efferent as f64;
        features.instability = round_to(coupling.instability, 2);
        features.circular_dependencies = coupling.circular_dependencies as f64;
        features.unit_test_presence = if file.is_test_file || tests.has_test_for(&file.path) {
            1.0
        } else {
            0.0
        };

        match &history {
            Some(history) => {
                let vcs = history.features(&root.join(&file.path));
                features.vcs_available = 1.0;
                features.commit_count = Some(vcs.commit_count);
                features.distinct_authors = Some(vcs.distinct_authors);
                features.file_age_days = Some(vcs.file_age_days);
                features.lines_added = Some(vcs.lines_added);
                features.lines_deleted = Some(vcs.lines_deleted);
            }
            None => {
                features.vcs_available = 0.0;
                features.commit_count = None;
                features.distinct_authors = None;
                features.file_age_days = None;
                features.lines_added = None;
                features.lines_deleted = None;
            }
        }
    }
    Ok(history.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn no_vcs() -> SmellscopeConfig {
        let mut config = SmellscopeConfig::default();
        config.vcs.enabled = false;
        config
    }

    #[test]
    fn test_project_metrics_are_filled() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "app/models.py",
            indoc! {"
                class User:
                    def name(self):
                        return self.first
            "},
        );
        write(dir.path(), "app/main.py", "from app.models import User\nimport os\n");
        write(dir.path(), "app/test_models.py", "def test_user():\n    assert True\n");

        let analysis = analyze_project(dir.path(), &no_vcs()).unwrap();
        assert_eq!(analysis.scanned_files, 3);
        assert_eq!(analysis.errors, 0);
        assert!(!analysis.vcs_available);

        let paths: Vec<_> = analysis.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("app/main.py"),
                PathBuf::from("app/models.py"),
                PathBuf::from("app/test_models.py"),
            ]
        );

        let models = &analysis.files[1];
        assert_eq!(models.features.afferent_coupling, 1.0);
        assert_eq!(models.features.unit_test_presence, 1.0);
        assert_eq!(models.features.commit_count, None);
        assert!(!models.is_test_file);
        assert!(analysis.files[2].is_test_file);

        let main = &analysis.files[0];
        assert_eq!(main.features.efferent_coupling, 2.0);
        assert_eq!(main.features.instability, 1.0);
    }

    #[test]
    fn test_unreadable_files_are_counted_not_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ok.py", "x = 1\n");
        std::fs::write(dir.path().join("bad.py"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let options = ProjectOptions {
            parallel: false,
            ..ProjectOptions::default()
        };
        let analysis = analyze_project_with(dir.path(), &no_vcs(), &options).unwrap();
        assert_eq!(analysis.scanned_files, 2);
        assert_eq!(analysis.errors, 1);
        assert_eq!(analysis.failures[0].path, PathBuf::from("bad.py"));
        assert_eq!(analysis.files.len(), 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(analyze_project(&dir.path().join("nope"), &no_vcs()).is_err());
    }
}
