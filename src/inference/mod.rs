//! Score unseen source trees with a trained artifact.

use crate::config::SmellscopeConfig;
use crate::core::{FileAnalysis, Language, SmellKind, ANY_SMELL_TARGET};
use crate::dataset::{Dataset, DatasetRecord};
use crate::errors::Result;
use crate::model::ModelArtifact;
use crate::observability::{self, Stage};
use crate::project::{analyze_project_with, ProjectOptions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRow {
    pub file_path: String,
    pub language: Language,
    pub pred_proba: f64,
    pub pred_label: bool,
    pub predicted_smells: Vec<SmellKind>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PredictionSummary {
    pub files_analyzed: usize,
    pub files_predicted_smelly: usize,
    pub mean_pred_proba: Option<f64>,
    pub threshold: f64,
}

impl PredictionSummary {
    pub fn from_rows(rows: &[PredictionRow], threshold: f64) -> Self {
        let mean_pred_proba = (!rows.is_empty())
            .then(|| rows.iter().map(|r| r.pred_proba).sum::<f64>() / rows.len() as f64);
        Self {
            files_analyzed: rows.len(),
            files_predicted_smelly: rows.iter().filter(|r| r.pred_label).count(),
            mean_pred_proba,
            threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResult {
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub rows: Vec<PredictionRow>,
    pub summary: PredictionSummary,
    /// Files that could not be read or parsed
    pub errors: usize,
}

pub struct Predictor {
    artifact: ModelArtifact,
}

impl Predictor {
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn load(path: &Path) -> Result<Self> {
        ModelArtifact::load(path).map(Self::from_artifact)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn threshold(&self) -> f64 {
        self.artifact.threshold
    }

    /// Score already analyzed files. Rows come back sorted by predicted
    /// label, then probability, both descending.
    pub fn predict_records(&self, files: &[FileAnalysis]) -> Vec<PredictionRow> {
        if files.is_empty() {
            return Vec::new();
        }
        let mut dataset = Dataset::new(self.artifact.pipeline.input_features.clone(), Vec::new());
        dataset.records = files
            .iter()
            .map(|file| DatasetRecord {
                file_path: file.path.to_string_lossy().into_owned(),
                language: file.language,
                features: self
                    .artifact
                    .pipeline
                    .input_features
                    .iter()
                    .map(|name| file.features.get(name))
                    .collect(),
                targets: Vec::new(),
            })
            .collect();

        let matrix = self.artifact.pipeline.transform(&dataset);
        let scores = self.artifact.predict_proba(&matrix);
        let targets = self.artifact.target_names();
        let any_index = targets.iter().position(|t| t == ANY_SMELL_TARGET);
        let threshold = self.threshold();

        let mut rows: Vec<PredictionRow> = dataset
            .records
            .into_iter()
            .enumerate()
            .map(|(row, record)| {
                let proba_of = |target: usize| scores[target][row];
                // Without an any-smell model the most likely smell stands in
                let pred_proba = match any_index {
                    Some(index) => proba_of(index),
                    None => (0..targets.len()).map(proba_of).fold(0.0, f64::max),
                };
                let predicted_smells = targets
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| proba_of(*index) >= threshold)
                    .filter_map(|(_, target)| SmellKind::from_target_name(target))
                    .collect();
                PredictionRow {
                    file_path: record.file_path,
                    language: record.language,
                    pred_proba,
                    pred_label: pred_proba >= threshold,
                    predicted_smells,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.pred_label
                .cmp(&a.pred_label)
                .then_with(|| b.pred_proba.total_cmp(&a.pred_proba))
        });
        rows
    }

    /// Analyze `dir` and score every file found
    pub fn predict_directory(
        &self,
        dir: &Path,
        config: &SmellscopeConfig,
        options: &ProjectOptions,
    ) -> Result<PredictionResult> {
        let analysis = analyze_project_with(dir, config, options)?;

        let _stage = observability::set_stage(Stage::Prediction);
        let rows = self.predict_records(&analysis.files);
        let summary = PredictionSummary::from_rows(&rows, self.threshold());
        log::info!(
            "Predicted {} of {} files as smelly",
            summary.files_predicted_smelly,
            summary.files_analyzed
        );
        Ok(PredictionResult {
            generated_at: Utc::now(),
            root: analysis.root,
            rows,
            summary,
            errors: analysis.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::features::FittedPipeline;
    use crate::model::{ClassBalance, ModelKind, TargetModel, FORMAT_VERSION};
    use std::collections::BTreeMap;

    /// An artifact whose any-smell probability is the scaled line count
    fn artifact() -> ModelArtifact {
        let mut scalers = BTreeMap::new();
        scalers.insert(
            "lines_of_code".to_string(),
            crate::features::MinMaxScaler { min: 0.0, max: 100.0 },
        );
        let pipeline = FittedPipeline {
            input_features: vec!["lines_of_code".to_string()],
            medians: vec![0.0],
            derived: Vec::new(),
            caps: BTreeMap::new(),
            dropped: Vec::new(),
            output_features: vec!["lines_of_code".to_string()],
            scalers,
        };
        let logistic = crate::model::LogisticRegression {
            learning_rate: 0.0,
            epochs: 0,
            l2: 0.0,
            weights: vec![10.0],
            bias: -5.0,
        };
        ModelArtifact {
            format_version: FORMAT_VERSION,
            version: "test".to_string(),
            created_at: Utc::now(),
            model_choice: TrainingConfig::default().model,
            threshold: 0.5,
            feature_names: pipeline.output_features.clone(),
            training_rows: 0,
            pipeline,
            models: vec![
                TargetModel {
                    target: "y_LongMethod".to_string(),
                    model: ModelKind::Constant { probability: 0.9 },
                    balance: ClassBalance::default(),
                },
                TargetModel {
                    target: ANY_SMELL_TARGET.to_string(),
                    model: ModelKind::Logistic(logistic),
                    balance: ClassBalance::default(),
                },
            ],
        }
    }

    fn file(path: &str, loc: f64) -> FileAnalysis {
        let mut f = FileAnalysis::empty(PathBuf::from(path), Language::Python);
        f.features.lines_of_code = loc;
        f
    }

    #[test]
    fn test_rows_are_sorted_and_labeled() {
        let predictor = Predictor::from_artifact(artifact());
        let rows = predictor.predict_records(&[
            file("small.py", 10.0),
            file("big.py", 90.0),
            file("medium.py", 60.0),
            file("tiny.py", 5.0),
        ]);
        let order: Vec<&str> = rows.iter().map(|r| r.file_path.as_str()).collect();
        assert_eq!(order, vec!["big.py", "medium.py", "small.py", "tiny.py"]);
        assert!(rows[0].pred_label && rows[1].pred_label);
        assert!(!rows[2].pred_label);
        assert_eq!(rows[3].predicted_smells, vec![SmellKind::LongMethod]);
        assert!(rows.iter().all(|r| (0.0..=1.0).contains(&r.pred_proba)));

        let summary = PredictionSummary::from_rows(&rows, 0.5);
        assert_eq!(summary.files_analyzed, 4);
        assert_eq!(summary.files_predicted_smelly, 2);
    }

    #[test]
    fn test_empty_directory_gives_zero_summary() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = SmellscopeConfig::default();
        config.vcs.enabled = false;
        let result = Predictor::from_artifact(artifact())
            .predict_directory(dir.path(), &config, &ProjectOptions::default())
            .unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.summary.files_analyzed, 0);
        assert_eq!(result.summary.mean_pred_proba, None);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Predictor::from_artifact(artifact()).predict_directory(
            &dir.path().join("missing"),
            &SmellscopeConfig::default(),
            &ProjectOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_stored_scaler_is_applied() {
        let predictor = Predictor::from_artifact(artifact());
        let rows = predictor.predict_records(&[file("a.py", 50.0)]);
        assert!((rows[0].pred_proba - 0.5).abs() < 1e-12);
    }
}
