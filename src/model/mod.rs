//! Binary classifiers and the persisted model artifact.

pub mod forest;
pub mod logistic;
pub mod matrix;
pub mod trainer;
pub mod tree;

pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use matrix::Matrix;
pub use trainer::{ClassBalance, ModelArtifact, TargetModel, Trainer, FORMAT_VERSION};
pub use tree::DecisionTree;

use crate::config::{ModelChoice, TrainingConfig};
use crate::errors::Result;
use serde::{Deserialize, Serialize};

/// A binary classifier producing the probability of the positive class
pub trait Classifier {
    fn fit(&mut self, x: &Matrix, y: &[u8]) -> Result<()>;

    fn predict_row(&self, row: &[f64]) -> f64;

    fn predict_proba(&self, x: &Matrix) -> Vec<f64> {
        x.rows
            .iter()
            .map(|row| self.predict_row(row).clamp(0.0, 1.0))
            .collect()
    }
}

/// Soft voting: the mean probability of the members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VotingClassifier {
    pub members: Vec<ModelKind>,
}

impl Classifier for VotingClassifier {
    fn fit(&mut self, x: &Matrix, y: &[u8]) -> Result<()> {
        for member in &mut self.members {
            member.fit(x, y)?;
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|m| m.predict_row(row)).sum::<f64>() / self.members.len() as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelKind {
    Logistic(LogisticRegression),
    Forest(RandomForest),
    Voting(VotingClassifier),
    /// Used for targets that had a single class in training
    Constant { probability: f64 },
}

impl ModelKind {
    /// An untrained model of the configured kind
    pub fn from_config(config: &TrainingConfig) -> Self {
        let logistic = || {
            ModelKind::Logistic(LogisticRegression::new(
                config.learning_rate,
                config.epochs,
                config.l2,
            ))
        };
        let forest = || {
            ModelKind::Forest(RandomForest::new(
                config.trees,
                config.max_depth,
                config.min_samples_split,
                config.seed,
            ))
        };
        match config.model {
            ModelChoice::Logistic => logistic(),
            ModelChoice::Forest => forest(),
            ModelChoice::Voting => ModelKind::Voting(VotingClassifier {
                members: vec![logistic(), forest()],
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Logistic(_) => "logistic",
            ModelKind::Forest(_) => "forest",
            ModelKind::Voting(_) => "voting",
            ModelKind::Constant { .. } => "constant",
        }
    }
}

impl Classifier for ModelKind {
    fn fit(&mut self, x: &Matrix, y: &[u8]) -> Result<()> {
        match self {
            ModelKind::Logistic(m) => m.fit(x, y),
            ModelKind::Forest(m) => m.fit(x, y),
            ModelKind::Voting(m) => m.fit(x, y),
            ModelKind::Constant { probability } => {
                let positives = y.iter().filter(|&&v| v == 1).count();
                *probability = if y.is_empty() {
                    0.0
                } else {
                    positives as f64 / y.len() as f64
                };
                Ok(())
            }
        }
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        match self {
            ModelKind::Logistic(m) => m.predict_row(row),
            ModelKind::Forest(m) => m.predict_row(row),
            ModelKind::Voting(m) => m.predict_row(row),
            ModelKind::Constant { probability } => *probability,
        }
    }
}
