//! Range checks on a loaded configuration.
//!
//! All problems are collected so a user sees every bad field in one run.

use super::SmellscopeConfig;
use crate::errors::{Error, Result};

/// Every out-of-range field as `section.field: problem`
pub fn validation_errors(config: &SmellscopeConfig) -> Vec<String> {
    let training = &config.training;
    let features = &config.features;
    let thresholds = &config.thresholds;

    let checks: Vec<(bool, String)> = vec![
        (
            training.test_ratio > 0.0 && training.test_ratio < 1.0,
            format!(
                "training.test_ratio: expected a value in (0, 1), got {}",
                training.test_ratio
            ),
        ),
        (
            (0.0..=1.0).contains(&training.threshold),
            format!(
                "training.threshold: expected a value in [0, 1], got {}",
                training.threshold
            ),
        ),
        (
            training.folds >= 2,
            format!("training.folds: need at least 2, got {}", training.folds),
        ),
        (
            training.trees > 0,
            "training.trees: must be greater than 0".to_string(),
        ),
        (
            training.max_depth > 0,
            "training.max_depth: must be greater than 0".to_string(),
        ),
        (
            training.learning_rate > 0.0 && training.learning_rate.is_finite(),
            format!(
                "training.learning_rate: must be positive, got {}",
                training.learning_rate
            ),
        ),
        (
            features.outlier_iqr_factor >= 0.0,
            format!(
                "features.outlier_iqr_factor: must not be negative, got {}",
                features.outlier_iqr_factor
            ),
        ),
        (
            thresholds.max_line_length > 0,
            "thresholds.max_line_length: must be greater than 0".to_string(),
        ),
    ];

    checks
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, message)| message)
        .collect()
}

impl SmellscopeConfig {
    pub fn validate(&self) -> Result<()> {
        let errors = validation_errors(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::config(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SmellscopeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_all_errors_are_reported() {
        let mut config = SmellscopeConfig::default();
        config.training.test_ratio = 1.0;
        config.training.threshold = 1.5;
        config.training.folds = 1;
        config.training.trees = 0;
        config.training.max_depth = 0;

        let errors = validation_errors(&config);
        assert_eq!(errors.len(), 5);
        assert!(errors[0].starts_with("training.test_ratio"));

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        let mut config = SmellscopeConfig::default();
        config.training.threshold = 0.0;
        assert!(config.validate().is_ok());
        config.training.threshold = 1.0;
        assert!(config.validate().is_ok());
    }
}
