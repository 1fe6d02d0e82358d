//! Logistic regression fitted by batch gradient descent with L2 penalty.

use super::{Classifier, Matrix};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Binary logistic regression trained with full-batch gradient descent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
    #[serde(default)]
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, epochs: usize, l2: f64) -> Self {
        Self {
            learning_rate,
            epochs,
            l2,
            weights: Vec::new(),
            bias: 0.0,
        }
    }

    fn linear(&self, row: &[f64]) -> f64 {
        self.bias
            + self
                .weights
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    /// Mean log-loss plus the L2 penalty, for monitoring convergence
    pub fn loss(&self, x: &Matrix, y: &[u8]) -> f64 {
        if x.is_empty() {
            return 0.0;
        }
        let eps = 1e-12;
        let data = x
            .rows
            .iter()
            .zip(y)
            .map(|(row, &label)| {
                let p = self.predict_row(row).clamp(eps, 1.0 - eps);
                if label == 1 {
                    -p.ln()
                } else {
                    -(1.0 - p).ln()
                }
            })
            .sum::<f64>()
            / x.n_rows() as f64;
        data + 0.5 * self.l2 * self.weights.iter().map(|w| w * w).sum::<f64>()
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Matrix, y: &[u8]) -> Result<()> {
        if x.n_rows() != y.len() {
            return Err(Error::model(format!(
                "{} rows but {} labels",
                x.n_rows(),
                y.len()
            )));
        }
        let n = x.n_rows();
        let p = x.n_cols();
        self.weights = vec![0.0; p];
        self.bias = 0.0;
        if n == 0 {
            return Ok(());
        }

        let scale = 1.0 / n as f64;
        for epoch in 0..self.epochs {
            let mut grad_w = vec![0.0; p];
            let mut grad_b = 0.0;
            for (row, &label) in x.rows.iter().zip(y) {
                let error = sigmoid(self.linear(row)) - f64::from(label);
                for (g, value) in grad_w.iter_mut().zip(row) {
                    *g += error * value;
                }
                grad_b += error;
            }
            for (w, g) in self.weights.iter_mut().zip(&grad_w) {
                *w -= self.learning_rate * (g * scale + self.l2 * *w);
            }
            self.bias -= self.learning_rate * grad_b * scale;

            if log::log_enabled!(log::Level::Trace) && epoch % 100 == 0 {
                log::trace!("epoch {epoch}: loss {:.5}", self.loss(x, y));
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        sigmoid(self.linear(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(!sigmoid(-800.0).is_nan());
    }

    #[test]
    fn test_learns_a_separable_problem() {
        let x = Matrix::new(
            vec!["x".into()],
            vec![vec![0.0], vec![0.1], vec![0.2], vec![0.8], vec![0.9], vec![1.0]],
        );
        let y = [0, 0, 0, 1, 1, 1];
        let mut model = LogisticRegression::new(1.0, 2000, 0.0);
        let before = {
            let mut fresh = model.clone();
            fresh.weights = vec![0.0];
            fresh.loss(&x, &y)
        };
        model.fit(&x, &y).unwrap();

        assert!(model.loss(&x, &y) < before);
        assert!(model.predict_row(&[0.0]) < 0.5);
        assert!(model.predict_row(&[1.0]) > 0.5);
    }

    #[test]
    fn test_mismatched_labels_are_rejected() {
        let x = Matrix::new(vec!["x".into()], vec![vec![0.0]]);
        assert!(LogisticRegression::new(0.1, 10, 0.0).fit(&x, &[0, 1]).is_err());
    }
}
