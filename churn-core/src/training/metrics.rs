//! Binary classification metrics

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
    pub samples: usize,
}

impl ClassificationMetrics {
    /// Precision, recall and F1 are 0.0 when undefined; ROC AUC is 0.5 when
    /// only one class is present.
    pub fn compute(labels: &[bool], predictions: &[bool], probabilities: &[f64]) -> Self {
        let samples = labels.len();
        if samples == 0 {
            return Self { roc_auc: 0.5, ..Default::default() };
        }

        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut correct = 0usize;

        for (&actual, &predicted) in labels.iter().zip(predictions) {
            match (actual, predicted) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
            if actual == predicted {
                correct += 1;
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            accuracy: ratio(correct, samples),
            precision,
            recall,
            f1,
            roc_auc: roc_auc(labels, probabilities),
            samples,
        }
    }
}

/// Mann-Whitney rank statistic, ties sharing their average rank.
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> f64 {
    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len().min(labels.len())).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based
        let average_rank = (start + end) as f64 / 2.0 + 1.0;
        for &i in &order[start..=end] {
            if labels[i] {
                positive_rank_sum += average_rank;
            }
        }
        start = end + 1;
    }

    let p = positives as f64;
    let n = negatives as f64;
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_metrics() {
        let labels = [true, true, false, false, true];
        let predictions = [true, false, false, true, true];
        let probabilities = [0.9, 0.4, 0.2, 0.6, 0.8];

        let m = ClassificationMetrics::compute(&labels, &predictions, &probabilities);
        assert_eq!(m.samples, 5);
        assert!((m.accuracy - 0.6).abs() < 1e-12);
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_auc_perfect_and_inverted() {
        let labels = [false, false, true, true];
        assert_eq!(roc_auc(&labels, &[0.1, 0.2, 0.8, 0.9]), 1.0);
        assert_eq!(roc_auc(&labels, &[0.9, 0.8, 0.2, 0.1]), 0.0);
    }

    #[test]
    fn test_auc_ties_count_half() {
        let labels = [false, true];
        assert_eq!(roc_auc(&labels, &[0.5, 0.5]), 0.5);

        // One tied pair out of four
        let labels = [false, false, true, true];
        assert_eq!(roc_auc(&labels, &[0.1, 0.7, 0.7, 0.9]), 0.875);
    }

    #[test]
    fn test_single_class() {
        let m = ClassificationMetrics::compute(&[false, false], &[false, false], &[0.1, 0.2]);
        assert_eq!(m.roc_auc, 0.5);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert_eq!(m.accuracy, 1.0);
    }
}
