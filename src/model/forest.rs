//! Random forest: bagged CART trees grown in parallel. Bootstrap samples and
//! per-tree seeds are drawn up front from one seeded RNG, so a fit is
//! reproducible whatever the thread count.

use super::tree::DecisionTree;
use super::{Classifier, Matrix};
use crate::errors::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged decision trees with per-split feature subsampling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomForest {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
    #[serde(default)]
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(n_trees: usize, max_depth: usize, min_samples_split: usize, seed: u64) -> Self {
        Self {
            n_trees,
            max_depth,
            min_samples_split,
            seed,
            trees: Vec::new(),
        }
    }
}

/// sqrt(p) features per split, at least one
fn features_per_split(n_features: usize) -> usize {
    ((n_features as f64).sqrt().round() as usize).max(1)
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Matrix, y: &[u8]) -> Result<()> {
        if self.n_trees == 0 {
            return Err(Error::model("a forest needs at least one tree"));
        }
        if x.n_rows() != y.len() {
            return Err(Error::model(format!(
                "{} rows but {} labels",
                x.n_rows(),
                y.len()
            )));
        }
        let n = x.n_rows();
        let max_features = features_per_split(x.n_cols());

        // Draw every bootstrap sample up front so results do not depend on
        // thread scheduling.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let plans: Vec<(Vec<usize>, u64)> = (0..self.n_trees)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                (sample, rng.gen::<u64>())
            })
            .collect();

        let (max_depth, min_samples_split) = (self.max_depth, self.min_samples_split);
        self.trees = plans
            .into_par_iter()
            .map(|(sample, tree_seed)| {
                let mut tree = DecisionTree::new(max_depth, min_samples_split)
                    .with_max_features(max_features, tree_seed);
                tree.fit_indices(x, y, &sample).map(|_| tree)
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Grew {} trees with {} features per split", self.trees.len(), max_features);
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Matrix, Vec<u8>) {
        let rows: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![i as f64 / 40.0, ((i * 7) % 5) as f64])
            .collect();
        let y = (0..40).map(|i| u8::from(i >= 20)).collect();
        (Matrix::new(vec!["signal".into(), "noise".into()], rows), y)
    }

    #[test]
    fn test_features_per_split() {
        assert_eq!(features_per_split(0), 1);
        assert_eq!(features_per_split(9), 3);
        assert_eq!(features_per_split(50), 7);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = data();
        let mut a = RandomForest::new(8, 4, 2, 7);
        let mut b = RandomForest::new(8, 4, 2, 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_thread_count_does_not_change_the_forest() {
        let (x, y) = data();
        let mut parallel = RandomForest::new(8, 4, 2, 11);
        parallel.fit(&x, &y).unwrap();

        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| {
                let mut forest = RandomForest::new(8, 4, 2, 11);
                forest.fit(&x, &y).map(|_| forest)
            })
            .unwrap();
        assert_eq!(parallel, single);
    }

    #[test]
    fn test_probabilities_follow_signal() {
        let (x, y) = data();
        let mut forest = RandomForest::new(20, 4, 2, 1);
        forest.fit(&x, &y).unwrap();
        let low = forest.predict_row(&[0.05, 1.0]);
        let high = forest.predict_row(&[0.95, 1.0]);
        assert!((0.0..=1.0).contains(&low) && (0.0..=1.0).contains(&high));
        assert!(high > low);
    }

    #[test]
    fn test_zero_trees_is_an_error() {
        let (x, y) = data();
        assert!(RandomForest::new(0, 4, 2, 1).fit(&x, &y).is_err());
    }
}
