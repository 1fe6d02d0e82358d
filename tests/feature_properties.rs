//! Property-based tests for the feature pipeline
//!
//! - every scaled column of the fitted matrix lies in [0, 1]
//! - transform is deterministic and reproduces the fitted matrix
//! - transform output width always equals the number of output features

use proptest::prelude::*;
use smellscope::config::FeatureConfig;
use smellscope::core::Language;
use smellscope::dataset::{Dataset, DatasetRecord};
use smellscope::features::FeaturePipeline;

const FEATURES: &[&str] = &[
    "lines_of_code",
    "average_cyclomatic_complexity",
    "max_cyclomatic_complexity",
    "average_cognitive_complexity",
    "halstead_effort",
    "halstead_estimated_bugs",
    "unit_test_presence",
    "file_age_days",
];

/// A value for `column`, missing now and then; the test flag stays 0/1
fn cell(column: usize) -> BoxedStrategy<Option<f64>> {
    if FEATURES[column] == "unit_test_presence" {
        prop_oneof![Just(Some(0.0)), Just(Some(1.0))].boxed()
    } else {
        prop_oneof![
            1 => Just(None::<f64>),
            6 => (0.0f64..5000.0).prop_map(Some),
        ]
        .boxed()
    }
}

fn row() -> impl Strategy<Value = Vec<Option<f64>>> {
    (0..FEATURES.len()).map(cell).collect::<Vec<_>>()
}

fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(row(), 2..40).prop_map(|rows| {
        let mut data = Dataset::new(
            FEATURES.iter().map(|s| s.to_string()).collect(),
            vec!["y_any_smell".to_string()],
        );
        for (i, features) in rows.into_iter().enumerate() {
            data.records.push(DatasetRecord {
                file_path: format!("src/f{i}.py"),
                language: Language::Python,
                features,
                targets: vec![(i % 2) as u8],
            });
        }
        data
    })
}

proptest! {
    #[test]
    fn prop_scaled_columns_are_normalized(data in dataset()) {
        let (fitted, matrix) = FeaturePipeline::fit(&data, &FeatureConfig::default()).unwrap();
        for (j, name) in matrix.columns.iter().enumerate() {
            if !fitted.scalers.contains_key(name) {
                continue;
            }
            for row in &matrix.rows {
                prop_assert!(
                    (0.0..=1.0).contains(&row[j]),
                    "{} = {} outside [0, 1]", name, row[j]
                );
            }
        }
    }

    #[test]
    fn prop_transform_reproduces_fit(data in dataset()) {
        let (fitted, matrix) = FeaturePipeline::fit(&data, &FeatureConfig::default()).unwrap();
        let first = fitted.transform(&data);
        let second = fitted.transform(&data);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &matrix);
    }

    #[test]
    fn prop_transform_width_matches_outputs(data in dataset(), drop in 0..FEATURES.len()) {
        let (fitted, _) = FeaturePipeline::fit(&data, &FeatureConfig::default()).unwrap();

        // unseen rows missing one column and carrying an extra one
        let mut names: Vec<String> = FEATURES.iter().map(|s| s.to_string()).collect();
        names.remove(drop);
        names.push("unknown_metric".to_string());
        let mut unseen = Dataset::new(names, vec!["y_any_smell".to_string()]);
        for record in &data.records {
            let mut features = record.features.clone();
            features.remove(drop);
            features.push(Some(7.0));
            unseen.records.push(DatasetRecord { features, ..record.clone() });
        }

        let matrix = fitted.transform(&unseen);
        prop_assert_eq!(matrix.n_rows(), unseen.len());
        for row in &matrix.rows {
            prop_assert_eq!(row.len(), fitted.output_features.len());
            prop_assert!(row.iter().all(|v| v.is_finite()));
        }
    }
}
