//! End-to-end run from a local checkout to a trained model.
//!
//! Every stage reads what the previous one wrote to the working directory,
//! so a failed run can be resumed stage by stage from the CLI.

use crate::collect::{clear_run_directory, extraction_root, SourceExtractor};
use crate::config::SmellscopeConfig;
use crate::dataset::Dataset;
use crate::errors::{Error, Result, ResultExt};
use crate::evaluation::{evaluate_holdout, HoldoutEvaluation};
use crate::features::FeaturePipeline;
use crate::io;
use crate::model::Trainer;
use crate::observability::{self, Stage};
use crate::project::{analyze_project_with, ProjectOptions};
use crate::smells::{label_records, SmellDetector};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// File locations under the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLayout {
    root: PathBuf,
}

impl WorkLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self) -> PathBuf {
        self.root.join("run")
    }

    pub fn raw_data(&self) -> PathBuf {
        self.root.join("raw").join("data.json")
    }

    pub fn labeled_data(&self) -> PathBuf {
        self.root.join("raw").join("data_with_labels.json")
    }

    pub fn dataset_csv(&self) -> PathBuf {
        self.root.join("raw").join("dataset.csv")
    }

    pub fn processed_csv(&self) -> PathBuf {
        self.root.join("processed").join("dataset_processed.csv")
    }

    pub fn fitted_pipeline(&self) -> PathBuf {
        self.root.join("processed").join("pipeline.json")
    }

    pub fn model(&self) -> PathBuf {
        self.root.join("models").join("model.json")
    }

    pub fn evaluation(&self) -> PathBuf {
        self.root.join("models").join("evaluation.json")
    }
}

impl Default for WorkLayout {
    fn default() -> Self {
        Self::new("data")
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub repo: PathBuf,
    pub layout: WorkLayout,
    /// Copy the sources into `<work>/run` and analyze the copy
    pub extract: bool,
    pub train: bool,
    pub project: ProjectOptions,
}

impl PipelineOptions {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            layout: WorkLayout::default(),
            extract: false,
            train: true,
            project: ProjectOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub repo: PathBuf,
    pub analyzed_root: PathBuf,
    pub extracted_files: Option<usize>,
    pub analyzed_files: usize,
    pub failed_files: usize,
    pub smelly_files: usize,
    pub dataset_rows: usize,
    pub features: usize,
    pub outputs: Vec<PathBuf>,
    pub model: Option<PathBuf>,
    pub evaluation: Option<HoldoutEvaluation>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }
}

/// Run `stage`, logging its start and tagging any failure with its name
fn stage<T>(name: Stage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let _guard = observability::set_stage(name);
    log::info!("Stage {name}: starting");
    let started = Instant::now();
    let result = f().context(format!("stage {name}"));
    match &result {
        Ok(_) => log::info!("Stage {name}: done in {:.2?}", started.elapsed()),
        Err(e) => log::error!("Stage {name}: {e}"),
    }
    result
}

pub fn run_pipeline(options: &PipelineOptions, config: &SmellscopeConfig) -> Result<PipelineReport> {
    let started = Instant::now();
    let layout = &options.layout;
    if !options.repo.is_dir() {
        return Err(Error::file_system(
            format!("{} is not a directory", options.repo.display()),
            &options.repo,
        ));
    }
    let mut outputs = Vec::new();

    let (analyzed_root, extracted_files) = if options.extract {
        stage(Stage::Collection, || {
            let run_dir = layout.run_dir();
            clear_run_directory(&run_dir)?;
            let extractor = SourceExtractor::new(config.languages());
            let kept = extractor.extract_to(&options.repo, &run_dir)?;
            Ok((extraction_root(&options.repo, &run_dir)?, Some(kept.len())))
        })?
    } else {
        (options.repo.clone(), None)
    };

    let analysis = stage(Stage::Parsing, || {
        let analysis = analyze_project_with(&analyzed_root, config, &options.project)?;
        io::write_json(&layout.raw_data(), &analysis.files)?;
        Ok(analysis)
    })?;
    outputs.push(layout.raw_data());

    let labeled = stage(Stage::Labeling, || {
        let detector = SmellDetector::new(config.thresholds.clone());
        let labeled = label_records(analysis.files, &detector);
        io::write_json(&layout.labeled_data(), &labeled)?;
        Ok(labeled)
    })?;
    outputs.push(layout.labeled_data());
    let smelly_files = labeled.iter().filter(|r| !r.smells.is_empty()).count();

    let dataset = stage(Stage::DatasetBuilding, || {
        let dataset = Dataset::from_labeled(&labeled, &config.features)?;
        dataset.write_csv(&layout.dataset_csv())?;
        Ok(dataset)
    })?;
    outputs.push(layout.dataset_csv());

    let features = stage(Stage::FeatureEngineering, || {
        let (fitted, matrix) = FeaturePipeline::fit(&dataset, &config.features)?;
        dataset
            .with_features(fitted.output_features.clone(), &matrix.rows)
            .write_csv(&layout.processed_csv())?;
        fitted.save(&layout.fitted_pipeline())?;
        Ok(fitted.output_features.len())
    })?;
    outputs.push(layout.processed_csv());
    outputs.push(layout.fitted_pipeline());

    let (model, evaluation) = if options.train {
        let trainer = Trainer::from_config(config);
        stage(Stage::Training, || trainer.train(&dataset)?.save(&layout.model()))?;
        outputs.push(layout.model());

        let evaluation = if dataset.len() < 2 {
            log::warn!("Skipping holdout evaluation: only {} rows", dataset.len());
            None
        } else {
            let evaluation = stage(Stage::Evaluation, || {
                let evaluation = evaluate_holdout(&dataset, &trainer)?;
                io::write_json(&layout.evaluation(), &evaluation)?;
                Ok(evaluation)
            })?;
            outputs.push(layout.evaluation());
            Some(evaluation)
        };
        (Some(layout.model()), evaluation)
    } else {
        (None, None)
    };

    let elapsed = started.elapsed();
    log::info!("Pipeline finished in {:.2?}", elapsed);
    Ok(PipelineReport {
        repo: options.repo.clone(),
        analyzed_root,
        extracted_files,
        analyzed_files: labeled.len(),
        failed_files: analysis.errors,
        smelly_files,
        dataset_rows: dataset.len(),
        features,
        outputs,
        model,
        evaluation,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = WorkLayout::new("work");
        assert_eq!(layout.run_dir(), PathBuf::from("work/run"));
        assert_eq!(layout.raw_data(), PathBuf::from("work/raw/data.json"));
        assert_eq!(
            layout.processed_csv(),
            PathBuf::from("work/processed/dataset_processed.csv")
        );
        assert_eq!(layout.model(), PathBuf::from("work/models/model.json"));
        assert_eq!(WorkLayout::default().root(), Path::new("data"));
    }

    #[test]
    fn test_missing_repo_is_an_error() {
        let options = PipelineOptions::new("/definitely/not/here");
        let err = run_pipeline(&options, &SmellscopeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
