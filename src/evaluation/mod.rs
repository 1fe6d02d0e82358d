//! Holdout and k-fold evaluation of the configured model.
//!
//! Every split fits the feature pipeline on its training rows only, so
//! the held-out rows never leak into medians, bounds or scalers.

pub mod metrics;

pub use metrics::{roc_auc, BinaryMetrics, MeanMetrics};

use crate::dataset::Dataset;
use crate::errors::{Error, Result};
use crate::features::FeaturePipeline;
use crate::model::{Classifier, Trainer};
use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Shuffled train/test indices. With two or more rows both sides get at
/// least one.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    if n < 2 {
        return (indices, Vec::new());
    }
    let n_test = ((n as f64 * test_ratio).round() as usize).clamp(1, n - 1);
    let test = indices.split_off(n - n_test);
    (indices, test)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetMetrics {
    pub target: String,
    pub metrics: BinaryMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoldoutEvaluation {
    pub generated_at: DateTime<Utc>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub threshold: f64,
    pub targets: Vec<TargetMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetFolds {
    pub target: String,
    pub folds: Vec<BinaryMetrics>,
    pub mean: MeanMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrossValidation {
    pub k: usize,
    pub rows: usize,
    pub targets: Vec<TargetFolds>,
}

/// Fit on `train`, score `test`, one entry per target
fn evaluate_split(
    dataset: &Dataset,
    trainer: &Trainer,
    train: &[usize],
    test: &[usize],
) -> Result<Vec<TargetMetrics>> {
    let train_set = dataset.subset(train);
    let test_set = dataset.subset(test);

    let (pipeline, train_matrix) = FeaturePipeline::fit(&train_set, &trainer.features)?;
    let models = trainer.fit_models(&train_matrix, &train_set)?;
    let test_matrix = pipeline.transform(&test_set);

    Ok(models
        .iter()
        .enumerate()
        .map(|(index, model)| {
            let proba = model.model.predict_proba(&test_matrix);
            TargetMetrics {
                target: model.target.clone(),
                metrics: BinaryMetrics::compute(
                    &test_set.target_column(index),
                    &proba,
                    trainer.training.threshold,
                ),
            }
        })
        .collect())
}

pub fn evaluate_holdout(dataset: &Dataset, trainer: &Trainer) -> Result<HoldoutEvaluation> {
    if dataset.len() < 2 {
        return Err(Error::dataset(format!(
            "holdout evaluation needs at least 2 rows, found {}",
            dataset.len()
        )));
    }
    let (train, test) = train_test_split(
        dataset.len(),
        trainer.training.test_ratio,
        trainer.training.seed,
    );
    let targets = evaluate_split(dataset, trainer, &train, &test)?;
    log::info!(
        "Holdout evaluation on {} test rows ({} train)",
        test.len(),
        train.len()
    );
    Ok(HoldoutEvaluation {
        generated_at: Utc::now(),
        train_rows: train.len(),
        test_rows: test.len(),
        threshold: trainer.training.threshold,
        targets,
    })
}

/// k-fold cross validation; `k` is clamped to `[2, rows]`
pub fn cross_validate(dataset: &Dataset, trainer: &Trainer, k: usize) -> Result<CrossValidation> {
    let n = dataset.len();
    if n < 2 {
        return Err(Error::dataset(format!(
            "cross validation needs at least 2 rows, found {n}"
        )));
    }
    let k = k.clamp(2, n);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(trainer.training.seed));

    let mut per_target: Vec<TargetFolds> = dataset
        .target_names
        .iter()
        .map(|target| TargetFolds {
            target: target.clone(),
            folds: Vec::with_capacity(k),
            mean: MeanMetrics::default(),
        })
        .collect();

    for fold in 0..k {
        let (start, end) = (fold * n / k, (fold + 1) * n / k);
        let test = &indices[start..end];
        let train: Vec<usize> = indices[..start]
            .iter()
            .chain(&indices[end..])
            .copied()
            .collect();
        let results = evaluate_split(dataset, trainer, &train, test)
            .map_err(|e| e.with_context(format!("fold {}", fold + 1)))?;
        for (slot, result) in per_target.iter_mut().zip(results) {
            slot.folds.push(result.metrics);
        }
        log::debug!("Finished fold {}/{}", fold + 1, k);
    }

    for target in &mut per_target {
        target.mean = MeanMetrics::of(&target.folds);
    }
    Ok(CrossValidation {
        k,
        rows: n,
        targets: per_target,
    })
}

fn format_auc(auc: Option<f64>) -> String {
    auc.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

impl HoldoutEvaluation {
    /// Plain-text table of the per-target scores
    pub fn report(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Target", "Accuracy", "Precision", "Recall", "F1", "ROC-AUC", "TP", "FP", "TN",
                "FN",
            ]);
        for t in &self.targets {
            let m = &t.metrics;
            table.add_row(vec![
                Cell::new(&t.target),
                Cell::new(format!("{:.3}", m.accuracy)),
                Cell::new(format!("{:.3}", m.precision)),
                Cell::new(format!("{:.3}", m.recall)),
                Cell::new(format!("{:.3}", m.f1)),
                Cell::new(format_auc(m.roc_auc)),
                Cell::new(m.tp),
                Cell::new(m.fp),
                Cell::new(m.tn),
                Cell::new(m.fn_),
            ]);
        }
        format!(
            "Holdout evaluation ({} train rows, {} test rows, threshold {:.2})\n{table}\n",
            self.train_rows, self.test_rows, self.threshold
        )
    }
}

impl CrossValidation {
    pub fn report(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Target", "Accuracy", "Precision", "Recall", "F1", "ROC-AUC"]);
        for t in &self.targets {
            table.add_row(vec![
                Cell::new(&t.target),
                Cell::new(format!("{:.3}", t.mean.accuracy)),
                Cell::new(format!("{:.3}", t.mean.precision)),
                Cell::new(format!("{:.3}", t.mean.recall)),
                Cell::new(format!("{:.3}", t.mean.f1)),
                Cell::new(format_auc(t.mean.roc_auc)),
            ]);
        }
        format!(
            "{}-fold cross validation over {} rows (mean scores)\n{table}\n",
            self.k, self.rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeatureConfig, ModelChoice, TrainingConfig};
    use crate::core::Language;
    use crate::dataset::DatasetRecord;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn dataset(n: usize) -> Dataset {
        let mut data = Dataset::new(
            vec!["size".into()],
            vec!["y_a".into(), "y_any_smell".into()],
        );
        for i in 0..n {
            data.records.push(DatasetRecord {
                file_path: format!("f{i}.py"),
                language: Language::Java,
                features: vec![Some(i as f64)],
                targets: vec![0, u8::from(i * 2 >= n)],
            });
        }
        data
    }

    fn trainer() -> Trainer {
        Trainer::new(
            FeatureConfig::default(),
            TrainingConfig {
                model: ModelChoice::Logistic,
                epochs: 100,
                ..TrainingConfig::default()
            },
        )
    }

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split(10, 0.2, 42);
        assert_eq!((train.len(), test.len()), (8, 2));
        let all: HashSet<usize> = train.iter().chain(&test).copied().collect();
        assert_eq!(all.len(), 10);

        assert_eq!(train_test_split(2, 0.01, 1).1.len(), 1);
        assert_eq!(train_test_split(2, 0.99, 1).0.len(), 1);
        assert_eq!(train_test_split(1, 0.5, 1), (vec![0], vec![]));
        assert_eq!(train_test_split(10, 0.2, 42), train_test_split(10, 0.2, 42));
    }

    #[test]
    fn test_holdout_reports_every_target() {
        let evaluation = evaluate_holdout(&dataset(20), &trainer()).unwrap();
        assert_eq!(evaluation.test_rows, 4);
        assert_eq!(evaluation.targets.len(), 2);
        assert_eq!(evaluation.targets[0].metrics.support(), 4);
        let report = evaluation.report();
        assert!(report.contains("y_any_smell"));
        assert!(report.contains("4 test rows"));
    }

    #[test]
    fn test_cross_validation_clamps_k() {
        let cv = cross_validate(&dataset(3), &trainer(), 10).unwrap();
        assert_eq!(cv.k, 3);
        assert_eq!(cv.targets[1].folds.len(), 3);
        let tested: usize = cv.targets[1].folds.iter().map(BinaryMetrics::support).sum();
        assert_eq!(tested, 3);

        let cv = cross_validate(&dataset(10), &trainer(), 1).unwrap();
        assert_eq!(cv.k, 2);
        assert!(cv.report().contains("2-fold"));
    }

    #[test]
    fn test_too_few_rows() {
        assert!(evaluate_holdout(&dataset(1), &trainer()).is_err());
        assert!(cross_validate(&dataset(1), &trainer(), 5).is_err());
    }
}
