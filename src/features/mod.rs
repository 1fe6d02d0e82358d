//! Feature engineering: turn raw dataset rows into a clean numeric matrix.
//!
//! Fitting learns medians, outlier bounds, the kept columns and min/max
//! scalers from training rows. The fitted pipeline replays exactly those
//! steps on unseen rows without refitting.

pub mod derived;
pub mod stats;

pub use derived::DerivedFeature;

use crate::config::FeatureConfig;
use crate::dataset::Dataset;
use crate::errors::{Error, Result};
use crate::model::Matrix;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    fn clip(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MinMaxScaler {
    pub min: f64,
    pub max: f64,
}

impl MinMaxScaler {
    fn scale(&self, value: f64) -> f64 {
        if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FittedPipeline {
    pub input_features: Vec<String>,
    /// Imputation value per input feature
    pub medians: Vec<f64>,
    pub derived: Vec<DerivedFeature>,
    pub caps: BTreeMap<String, OutlierBounds>,
    pub dropped: Vec<String>,
    pub output_features: Vec<String>,
    pub scalers: BTreeMap<String, MinMaxScaler>,
}

pub struct FeaturePipeline;

impl FeaturePipeline {
    pub fn fit(dataset: &Dataset, config: &FeatureConfig) -> Result<(FittedPipeline, Matrix)> {
        if dataset.is_empty() {
            return Err(Error::dataset("cannot fit features on an empty dataset"));
        }

        let input_features = dataset.feature_names.clone();
        let medians = (0..input_features.len())
            .map(|i| {
                let present: Vec<f64> = dataset
                    .records
                    .iter()
                    .filter_map(|r| r.features.get(i).copied().flatten())
                    .filter(|v| v.is_finite())
                    .collect();
                stats::median(&present).unwrap_or(0.0)
            })
            .collect();

        let available: HashSet<&str> = input_features.iter().map(String::as_str).collect();
        let derived: Vec<DerivedFeature> = DerivedFeature::ALL
            .into_iter()
            .filter(|d| !available.contains(d.name()))
            .filter(|d| {
                let complete = d.inputs().iter().all(|input| available.contains(input));
                if !complete {
                    log::debug!("Skipping derived feature {}: inputs missing", d.name());
                }
                complete
            })
            .collect();

        let mut pipeline = FittedPipeline {
            input_features,
            medians,
            derived,
            caps: BTreeMap::new(),
            dropped: Vec::new(),
            output_features: Vec::new(),
            scalers: BTreeMap::new(),
        };

        let names = pipeline.expanded_names();
        let mut table = pipeline.impute_and_derive(dataset);
        let columns: Vec<Vec<f64>> = (0..names.len())
            .map(|j| finite_column(&table, j))
            .collect();
        let binary: Vec<bool> = columns.iter().map(|c| stats::is_binary(c)).collect();

        // Outlier caps on non-binary columns
        let mut capped_columns = Vec::new();
        for (j, column) in columns.iter().enumerate() {
            if binary[j] {
                continue;
            }
            let (Some(q1), Some(q3)) = (stats::quantile(column, 0.25), stats::quantile(column, 0.75))
            else {
                continue;
            };
            let iqr = q3 - q1;
            let bounds = OutlierBounds {
                lower: q1 - config.outlier_iqr_factor * iqr,
                upper: q3 + config.outlier_iqr_factor * iqr,
            };
            if !(bounds.lower.is_finite() && bounds.upper.is_finite()) {
                continue;
            }
            if column.iter().any(|&v| v < bounds.lower || v > bounds.upper) {
                capped_columns.push(names[j].clone());
            }
            pipeline.caps.insert(names[j].clone(), bounds);
        }
        pipeline.apply_caps(&names, &mut table);
        if !capped_columns.is_empty() {
            log::info!("Capped outliers in {} columns: {:?}", capped_columns.len(), capped_columns);
        }

        // Variance filter runs on the capped values
        let check_variance = table.len() >= 2;
        let drop_set: HashSet<&str> = config.drop_columns.iter().map(String::as_str).collect();
        for (j, name) in names.iter().enumerate() {
            let column = finite_column(&table, j);
            let low_variance =
                check_variance && stats::sample_variance(&column) < config.variance_threshold;
            if low_variance || drop_set.contains(name.as_str()) {
                pipeline.dropped.push(name.clone());
            } else {
                pipeline.output_features.push(name.clone());
                if !binary[j] {
                    if let Some((min, max)) = stats::min_max(&column) {
                        pipeline.scalers.insert(name.clone(), MinMaxScaler { min, max });
                    }
                }
            }
        }
        if !pipeline.dropped.is_empty() {
            log::info!("Dropped {} columns: {:?}", pipeline.dropped.len(), pipeline.dropped);
        }

        let matrix = pipeline.finish(&names, table);
        log::info!(
            "Fitted feature pipeline: {} inputs, {} derived, {} outputs",
            pipeline.input_features.len(),
            pipeline.derived.len(),
            pipeline.output_features.len()
        );
        Ok((pipeline, matrix))
    }
}

fn finite_column(table: &[Vec<f64>], index: usize) -> Vec<f64> {
    table
        .iter()
        .map(|row| row[index])
        .filter(|v| v.is_finite())
        .collect()
}

impl FittedPipeline {
    /// Apply the fitted steps to `dataset`. Columns the pipeline never saw
    /// are ignored and features it expects but cannot find are imputed.
    pub fn transform(&self, dataset: &Dataset) -> Matrix {
        let names = self.expanded_names();
        let mut table = self.impute_and_derive(dataset);
        self.apply_caps(&names, &mut table);
        self.finish(&names, table)
    }

    /// Input features followed by the derived ones
    fn expanded_names(&self) -> Vec<String> {
        self.input_features
            .iter()
            .cloned()
            .chain(self.derived.iter().map(|d| d.name().to_string()))
            .collect()
    }

    fn impute_and_derive(&self, dataset: &Dataset) -> Vec<Vec<f64>> {
        let source_index: Vec<Option<usize>> = self
            .input_features
            .iter()
            .map(|name| dataset.feature_index(name))
            .collect();
        let input_index: HashMap<&str, usize> = self
            .input_features
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        dataset
            .records
            .iter()
            .map(|record| {
                let mut row: Vec<f64> = source_index
                    .iter()
                    .zip(&self.medians)
                    .map(|(index, median)| {
                        index
                            .and_then(|i| record.features.get(i).copied().flatten())
                            .filter(|v| v.is_finite())
                            .unwrap_or(*median)
                    })
                    .collect();
                for feature in &self.derived {
                    let inputs: Vec<f64> = feature
                        .inputs()
                        .iter()
                        .map(|name| input_index.get(name).map(|&i| row[i]).unwrap_or(0.0))
                        .collect();
                    let value = feature.compute(&inputs);
                    row.push(value);
                }
                row
            })
            .collect()
    }

    fn apply_caps(&self, names: &[String], table: &mut [Vec<f64>]) {
        let caps: Vec<Option<&OutlierBounds>> = names.iter().map(|n| self.caps.get(n)).collect();
        for row in table.iter_mut() {
            for (value, cap) in row.iter_mut().zip(&caps) {
                if let Some(bounds) = cap {
                    if value.is_finite() {
                        *value = bounds.clip(*value);
                    }
                }
            }
        }
    }

    /// Select the output columns, scale them and replace non-finite values
    fn finish(&self, names: &[String], table: Vec<Vec<f64>>) -> Matrix {
        let selected: Vec<(Option<usize>, Option<&MinMaxScaler>)> = self
            .output_features
            .iter()
            .map(|name| {
                (
                    names.iter().position(|n| n == name),
                    self.scalers.get(name),
                )
            })
            .collect();

        let mut non_finite = 0usize;
        let rows = table
            .iter()
            .map(|row| {
                selected
                    .iter()
                    .map(|(index, scaler)| {
                        let raw = index.map(|i| row[i]).unwrap_or(0.0);
                        let value = scaler.map(|s| s.scale(raw)).unwrap_or(raw);
                        if value.is_finite() {
                            value
                        } else {
                            non_finite += 1;
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();

        if non_finite > 0 {
            log::warn!("Replaced {non_finite} NaN or infinite values with 0");
        }
        Matrix::new(self.output_features.clone(), rows)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::write_json(path, self)
    }

    pub fn load(path: &Path) -> Result<Self> {
        crate::io::read_json(path)
            .map_err(|e| e.with_context(format!("loading feature pipeline {}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Language;
    use crate::dataset::DatasetRecord;
    use pretty_assertions::assert_eq;

    fn dataset(names: &[&str], rows: Vec<Vec<Option<f64>>>) -> Dataset {
        let mut dataset = Dataset::new(
            names.iter().map(|s| s.to_string()).collect(),
            vec!["y_any_smell".to_string()],
        );
        for (i, features) in rows.into_iter().enumerate() {
            dataset.records.push(DatasetRecord {
                file_path: format!("f{i}.py"),
                language: Language::Python,
                features,
                targets: vec![(i % 2) as u8],
            });
        }
        dataset
    }

    fn no_drop() -> FeatureConfig {
        FeatureConfig {
            drop_columns: Vec::new(),
            variance_threshold: 0.0,
            ..FeatureConfig::default()
        }
    }

    #[test]
    fn test_imputes_with_median() {
        let data = dataset(
            &["a"],
            vec![vec![Some(1.0)], vec![None], vec![Some(3.0)], vec![Some(10.0)]],
        );
        let (pipeline, matrix) = FeaturePipeline::fit(&data, &no_drop()).unwrap();
        assert_eq!(pipeline.medians, vec![3.0]);
        // 1, 3, 3, 10 scaled to [0, 1]
        let column = matrix.column(0);
        assert_eq!(column[1], column[2]);
        assert_eq!(column[0], 0.0);
        assert_eq!(column[3], 1.0);
    }

    #[test]
    fn test_empty_column_imputes_zero() {
        let data = dataset(&["a", "b"], vec![vec![Some(1.0), None], vec![Some(2.0), None]]);
        let (pipeline, _) = FeaturePipeline::fit(&data, &no_drop()).unwrap();
        assert_eq!(pipeline.medians, vec![1.5, 0.0]);
    }

    #[test]
    fn test_derives_only_with_complete_inputs() {
        let data = dataset(
            &["documentation_coverage", "comment_percentage", "unit_test_presence"],
            vec![
                vec![Some(40.0), Some(20.0), Some(1.0)],
                vec![Some(10.0), Some(50.0), Some(0.0)],
            ],
        );
        let (pipeline, _) = FeaturePipeline::fit(&data, &no_drop()).unwrap();
        assert_eq!(
            pipeline.derived,
            vec![DerivedFeature::DocQuality, DerivedFeature::HasTests]
        );
        assert!(pipeline.output_features.contains(&"doc_quality".to_string()));
    }

    #[test]
    fn test_caps_outliers() {
        let mut rows: Vec<Vec<Option<f64>>> = (0..8).map(|i| vec![Some(i as f64)]).collect();
        rows.push(vec![Some(1000.0)]);
        let data = dataset(&["a"], rows);
        let config = FeatureConfig {
            outlier_iqr_factor: 1.0,
            ..no_drop()
        };
        let (pipeline, _) = FeaturePipeline::fit(&data, &config).unwrap();
        let bounds = pipeline.caps["a"];
        // q1 = 2, q3 = 6
        assert_eq!(bounds, OutlierBounds { lower: -2.0, upper: 10.0 });
        assert_eq!(pipeline.scalers["a"].max, 10.0);
    }

    #[test]
    fn test_drops_low_variance_and_listed_columns() {
        let data = dataset(
            &["flat", "vcs_available", "moving"],
            vec![
                vec![Some(5.0), Some(1.0), Some(1.0)],
                vec![Some(5.0), Some(0.0), Some(9.0)],
                vec![Some(5.0), Some(1.0), Some(4.0)],
            ],
        );
        let (pipeline, matrix) = FeaturePipeline::fit(&data, &FeatureConfig::default()).unwrap();
        assert_eq!(pipeline.output_features, vec!["moving".to_string()]);
        assert_eq!(pipeline.dropped, vec!["flat".to_string(), "vcs_available".to_string()]);
        assert_eq!(matrix.n_cols(), 1);
    }

    #[test]
    fn test_binary_columns_are_not_scaled_or_capped() {
        let data = dataset(
            &["flag", "x"],
            vec![
                vec![Some(1.0), Some(3.0)],
                vec![Some(0.0), Some(5.0)],
                vec![Some(1.0), Some(7.0)],
            ],
        );
        let (pipeline, matrix) = FeaturePipeline::fit(&data, &no_drop()).unwrap();
        assert!(!pipeline.caps.contains_key("flag"));
        assert!(!pipeline.scalers.contains_key("flag"));
        assert_eq!(matrix.column(0), vec![1.0, 0.0, 1.0]);
        assert_eq!(matrix.column(1), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_transform_handles_missing_and_extra_columns() {
        let train = dataset(
            &["a", "b"],
            vec![
                vec![Some(0.0), Some(10.0)],
                vec![Some(4.0), Some(20.0)],
                vec![Some(2.0), Some(30.0)],
            ],
        );
        let (pipeline, fitted) = FeaturePipeline::fit(&train, &no_drop()).unwrap();
        assert_eq!(pipeline.transform(&train), fitted);

        let unseen = dataset(&["extra", "b"], vec![vec![Some(99.0), Some(25.0)]]);
        let matrix = pipeline.transform(&unseen);
        assert_eq!(matrix.columns, pipeline.output_features);
        // a is imputed with its median 2.0 -> 0.5
        assert_eq!(matrix.rows, vec![vec![0.5, 0.75]]);
    }

    #[test]
    fn test_non_finite_values_become_zero() {
        let data = dataset(
            &["halstead_effort", "halstead_estimated_bugs"],
            vec![
                vec![Some(10.0), Some(-1.0)],
                vec![Some(20.0), Some(1.0)],
                vec![Some(30.0), Some(2.0)],
            ],
        );
        let (_, matrix) = FeaturePipeline::fit(&data, &no_drop()).unwrap();
        assert!(matrix.rows.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_pipeline_round_trips_through_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = dataset(&["a"], vec![vec![Some(1.0)], vec![Some(2.0)]]);
        let (pipeline, _) = FeaturePipeline::fit(&data, &no_drop()).unwrap();
        let path = dir.path().join("pipeline.json");
        pipeline.save(&path).unwrap();
        assert_eq!(FittedPipeline::load(&path).unwrap(), pipeline);
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let data = dataset(&["a"], Vec::new());
        assert!(FeaturePipeline::fit(&data, &no_drop()).is_err());
    }
}
