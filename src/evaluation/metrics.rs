use serde::{Deserialize, Serialize};

/// Confusion counts and the usual scores for one binary target
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BinaryMetrics {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `None` when only one class is present
    pub roc_auc: Option<f64>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl BinaryMetrics {
    pub fn compute(y_true: &[u8], proba: &[f64], threshold: f64) -> Self {
        let mut metrics = Self::default();
        for (&label, &p) in y_true.iter().zip(proba) {
            match (label == 1, p >= threshold) {
                (true, true) => metrics.tp += 1,
                (false, true) => metrics.fp += 1,
                (false, false) => metrics.tn += 1,
                (true, false) => metrics.fn_ += 1,
            }
        }
        let total = metrics.tp + metrics.fp + metrics.tn + metrics.fn_;
        metrics.accuracy = ratio(metrics.tp + metrics.tn, total);
        metrics.precision = ratio(metrics.tp, metrics.tp + metrics.fp);
        metrics.recall = ratio(metrics.tp, metrics.tp + metrics.fn_);
        metrics.f1 = if metrics.precision + metrics.recall > 0.0 {
            2.0 * metrics.precision * metrics.recall / (metrics.precision + metrics.recall)
        } else {
            0.0
        };
        metrics.roc_auc = roc_auc(y_true, proba);
        metrics
    }

    pub fn support(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }
}

/// Area under the ROC curve from the Mann-Whitney rank statistic. Tied
/// scores share their average rank.
pub fn roc_auc(y_true: &[u8], scores: &[f64]) -> Option<f64> {
    let n = y_true.len().min(scores.len());
    let positives = y_true[..n].iter().filter(|&&y| y == 1).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // 1-based ranks start+1 ..= end+1
        let average = (start + end) as f64 / 2.0 + 1.0;
        for &i in &order[start..=end] {
            ranks[i] = average;
        }
        start = end + 1;
    }

    let positive_rank_sum: f64 = (0..n).filter(|&i| y_true[i] == 1).map(|i| ranks[i]).sum();
    let p = positives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}

/// Mean of each score over several evaluations
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MeanMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Mean over the folds where it was defined
    pub roc_auc: Option<f64>,
}

impl MeanMetrics {
    pub fn of(runs: &[BinaryMetrics]) -> Self {
        if runs.is_empty() {
            return Self::default();
        }
        let n = runs.len() as f64;
        let mean = |f: fn(&BinaryMetrics) -> f64| runs.iter().map(f).sum::<f64>() / n;
        let aucs: Vec<f64> = runs.iter().filter_map(|m| m.roc_auc).collect();
        Self {
            accuracy: mean(|m| m.accuracy),
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            roc_auc: (!aucs.is_empty()).then(|| aucs.iter().sum::<f64>() / aucs.len() as f64),
        }
    }
}
