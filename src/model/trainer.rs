//! Fit the feature pipeline and one classifier per target, and persist the
//! result as a single JSON artifact.

use super::{Classifier, Matrix, ModelKind};
use crate::config::{FeatureConfig, ModelChoice, SmellscopeConfig, TrainingConfig};
use crate::dataset::Dataset;
use crate::errors::{Error, Result};
use crate::features::{FeaturePipeline, FittedPipeline};
use crate::observability::{self, Stage};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Bumped whenever the artifact layout changes incompatibly
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassBalance {
    pub positives: usize,
    pub negatives: usize,
}

impl ClassBalance {
    pub fn of(labels: &[u8]) -> Self {
        let positives = labels.iter().filter(|&&v| v == 1).count();
        Self {
            positives,
            negatives: labels.len() - positives,
        }
    }

    pub fn is_single_class(&self) -> bool {
        self.positives == 0 || self.negatives == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetModel {
    pub target: String,
    pub model: ModelKind,
    pub balance: ClassBalance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub model_choice: ModelChoice,
    pub threshold: f64,
    pub feature_names: Vec<String>,
    pub training_rows: usize,
    pub pipeline: FittedPipeline,
    pub models: Vec<TargetModel>,
}

impl ModelArtifact {
    pub fn model(&self, target: &str) -> Option<&TargetModel> {
        self.models.iter().find(|m| m.target == target)
    }

    pub fn target_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.target.clone()).collect()
    }

    /// Probabilities per target (outer, in `models` order) and row (inner)
    pub fn predict_proba(&self, x: &Matrix) -> Vec<Vec<f64>> {
        self.models.iter().map(|m| m.model.predict_proba(x)).collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::write_json(path, self)?;
        log::info!("Saved model artifact to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let value: Value = crate::io::read_json(path)?;
        let found = value.get("format_version").and_then(Value::as_u64);
        if found != Some(u64::from(FORMAT_VERSION)) {
            let found = found.map_or_else(|| "none".to_string(), |v| v.to_string());
            return Err(Error::model(format!(
                "{} has artifact format {found}, expected {FORMAT_VERSION}",
                path.display()
            )));
        }
        let artifact: Self = serde_json::from_value(value)?;
        log::debug!(
            "Loaded {} model artifact with {} targets",
            artifact.model_choice,
            artifact.models.len()
        );
        Ok(artifact)
    }
}

pub struct Trainer {
    pub features: FeatureConfig,
    pub training: TrainingConfig,
}

impl Trainer {
    pub fn new(features: FeatureConfig, training: TrainingConfig) -> Self {
        Self { features, training }
    }

    pub fn from_config(config: &SmellscopeConfig) -> Self {
        Self::new(config.features.clone(), config.training.clone())
    }

    /// Fit the feature pipeline on `dataset` and train every target
    pub fn train(&self, dataset: &Dataset) -> Result<ModelArtifact> {
        if dataset.is_empty() {
            return Err(Error::model("cannot train on an empty dataset"));
        }
        let (pipeline, matrix) = {
            let _stage = observability::set_stage(Stage::FeatureEngineering);
            FeaturePipeline::fit(dataset, &self.features)?
        };

        let _stage = observability::set_stage(Stage::Training);
        let models = self.fit_models(&matrix, dataset)?;
        log::info!(
            "Trained {} {} models on {} rows and {} features",
            models.len(),
            self.training.model,
            dataset.len(),
            matrix.n_cols()
        );

        Ok(ModelArtifact {
            format_version: FORMAT_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            model_choice: self.training.model,
            threshold: self.training.threshold,
            feature_names: pipeline.output_features.clone(),
            training_rows: dataset.len(),
            pipeline,
            models,
        })
    }

    /// Train one model per target of `dataset` on an already transformed
    /// matrix. Targets with a single class get a constant model.
    pub fn fit_models(&self, x: &Matrix, dataset: &Dataset) -> Result<Vec<TargetModel>> {
        dataset
            .target_names
            .par_iter()
            .enumerate()
            .map(|(index, target)| {
                let labels = dataset.target_column(index);
                let balance = ClassBalance::of(&labels);
                let mut model = if balance.is_single_class() {
                    log::warn!(
                        "Target {target} has a single class ({} positive, {} negative), using a constant model",
                        balance.positives,
                        balance.negatives
                    );
                    ModelKind::Constant { probability: 0.0 }
                } else {
                    ModelKind::from_config(&self.training)
                };
                model
                    .fit(x, &labels)
                    .map_err(|e| e.with_context(format!("training {target}")))?;
                Ok(TargetModel {
                    target: target.clone(),
                    model,
                    balance,
                })
            })
            .collect()
    }
}
