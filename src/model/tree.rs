//! CART decision tree on Gini impurity.

use super::{Classifier, Matrix};
use crate::errors::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        /// Fraction of positive training rows that reached this leaf
        probability: f64,
        samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { probability, .. } => return *probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features tried per split; all of them when `None`
    pub max_features: Option<usize>,
    pub seed: u64,
    #[serde(default)]
    pub root: Option<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

impl DecisionTree {
    pub fn new(max_depth: usize, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split,
            max_features: None,
            seed: 0,
            root: None,
        }
    }

    pub fn with_max_features(mut self, max_features: usize, seed: u64) -> Self {
        self.max_features = Some(max_features);
        self.seed = seed;
        self
    }

    /// Fit on the rows at `indices`. Used by forests to pass bootstrap
    /// samples without copying the matrix.
    pub fn fit_indices(&mut self, x: &Matrix, y: &[u8], indices: &[usize]) -> Result<()> {
        if x.n_rows() != y.len() {
            return Err(Error::model(format!(
                "{} rows but {} labels",
                x.n_rows(),
                y.len()
            )));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.root = Some(self.grow(x, y, indices.to_vec(), 0, &mut rng));
        Ok(())
    }

    fn grow(
        &self,
        x: &Matrix,
        y: &[u8],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        let positives = indices.iter().filter(|&&i| y[i] == 1).count();
        let leaf = Node::Leaf {
            probability: if indices.is_empty() {
                0.0
            } else {
                positives as f64 / indices.len() as f64
            },
            samples: indices.len(),
        };

        let pure = positives == 0 || positives == indices.len();
        if pure || depth >= self.max_depth || indices.len() < self.min_samples_split.max(2) {
            return leaf;
        }

        let Some(best) = self.best_split(x, y, &indices, rng) else {
            return leaf;
        };
        if best.impurity >= gini(positives, indices.len()) {
            return leaf;
        }

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x.rows[i][best.feature] <= best.threshold);
        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.grow(x, y, left, depth + 1, rng)),
            right: Box::new(self.grow(x, y, right, depth + 1, rng)),
        }
    }

    fn candidate_features(&self, n_features: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..n_features).collect();
        if let Some(k) = self.max_features {
            if k < n_features {
                features.shuffle(rng);
                features.truncate(k.max(1));
                features.sort_unstable();
            }
        }
        features
    }

    fn best_split(
        &self,
        x: &Matrix,
        y: &[u8],
        indices: &[usize],
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let total = indices.len();
        let total_pos = indices.iter().filter(|&&i| y[i] == 1).count();
        let mut best: Option<BestSplit> = None;

        for feature in self.candidate_features(x.n_cols(), rng) {
            let mut sorted: Vec<(f64, u8)> = indices
                .iter()
                .map(|&i| (x.rows[i][feature], y[i]))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_pos = 0;
            for split in 1..total {
                left_pos += usize::from(sorted[split - 1].1);
                let (prev, next) = (sorted[split - 1].0, sorted[split].0);
                if prev == next {
                    continue;
                }
                let right_pos = total_pos - left_pos;
                let impurity = (split as f64 * gini(left_pos, split)
                    + (total - split) as f64 * gini(right_pos, total - split))
                    / total as f64;
                if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (prev + next) / 2.0,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Matrix, y: &[u8]) -> Result<()> {
        let indices: Vec<usize> = (0..x.n_rows()).collect();
        self.fit_indices(x, y, &indices)
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.root.as_ref().map(|n| n.predict(row)).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xor_like() -> (Matrix, Vec<u8>) {
        let rows = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.1, 0.1],
            vec![0.9, 0.9],
        ];
        (Matrix::new(vec!["a".into(), "b".into()], rows), vec![0, 1, 1, 0, 0, 0])
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(0, 4), 0.0);
        assert_eq!(gini(2, 4), 0.5);
        assert_eq!(gini(0, 0), 0.0);
    }

    #[test]
    fn test_fits_training_data() {
        let (x, y) = xor_like();
        let mut tree = DecisionTree::new(5, 2);
        tree.fit(&x, &y).unwrap();
        for (row, &label) in x.rows.iter().zip(&y) {
            assert_eq!(tree.predict_row(row), f64::from(label));
        }
    }

    #[test]
    fn test_depth_limit_gives_fractional_leaves() {
        let (x, y) = xor_like();
        let mut stump = DecisionTree::new(0, 2);
        stump.fit(&x, &y).unwrap();
        assert_eq!(stump.root.as_ref().map(Node::depth), Some(0));
        assert!((stump.predict_row(&[0.0, 0.0]) - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_thresholds_are_midpoints() {
        let x = Matrix::new(vec!["a".into()], vec![vec![1.0], vec![3.0]]);
        let mut tree = DecisionTree::new(3, 2);
        tree.fit(&x, &[0, 1]).unwrap();
        match tree.root {
            Some(Node::Split { threshold, .. }) => assert_eq!(threshold, 2.0),
            other => panic!("expected a split, got {other:?}"),
        }
    }

    #[test]
    fn test_untrained_tree_predicts_zero() {
        assert_eq!(DecisionTree::new(3, 2).predict_row(&[1.0]), 0.0);
    }
}
