//! Evaluation metrics for binary classification models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Tally aligned truth/prediction pairs; out-of-range labels are ignored.
    pub fn from_labels(n_classes: usize, truth: &[usize], predicted: &[usize]) -> Self {
        let mut cm = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted) {
            cm.add(t, p);
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f64,
    /// `TP / (TP + FN)`.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision, recall and F1 from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f64;
        let mut fp = 0f64;
        let mut fn_ = 0f64;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f64;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f64;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            f1: f1_score(precision, recall),
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    let mut correct = 0u64;
    for class_idx in 0..cm.n_classes {
        correct += cm.get(class_idx, class_idx) as u64;
    }
    let total = cm.total();
    if total == 0 {
        0.0
    } else {
        (correct as f64) / (total as f64)
    }
}

/// Harmonic mean of precision and recall (0 when both are 0).
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Area under the ROC curve for binary truth (`true` = positive) and scores.
///
/// Uses the rank-sum formulation with tied scores sharing their average rank.
/// Returns `None` when only one class is present.
pub fn roc_auc(truth: &[bool], scores: &[f64]) -> Option<f64> {
    let n = truth.len().min(scores.len());
    let positives = truth[..n].iter().filter(|&&t| t).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0f64;
    let mut start = 0usize;
    while start < n {
        let mut end = start + 1;
        while end < n && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the tie group spans ranks start+1 ..= end.
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            if truth[idx] {
                positive_rank_sum += avg_rank;
            }
        }
        start = end;
    }
    let p = positives as f64;
    let q = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * q))
}

/// Text report with per-class precision/recall/F1/support plus accuracy,
/// macro and support-weighted averages.
pub fn classification_report(cm: &ConfusionMatrix, class_names: &[String]) -> String {
    let stats = precision_recall_by_class(cm);
    let total: u32 = stats.iter().map(|s| s.support).sum();
    let width = class_names
        .iter()
        .map(|n| n.len())
        .chain(std::iter::once("weighted avg".len()))
        .max()
        .unwrap_or(12);

    let mut out = format!(
        "{:>width$}  {:>9}  {:>9}  {:>9}  {:>9}\n\n",
        "", "precision", "recall", "f1-score", "support"
    );
    for (idx, s) in stats.iter().enumerate() {
        let name = class_names
            .get(idx)
            .cloned()
            .unwrap_or_else(|| idx.to_string());
        out.push_str(&format!(
            "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
            name, s.precision, s.recall, s.f1, s.support
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "{:>width$}  {:>9}  {:>9}  {:>9.2}  {:>9}\n",
        "accuracy",
        "",
        "",
        accuracy(cm),
        total
    ));

    let k = stats.len().max(1) as f64;
    let macro_p = stats.iter().map(|s| s.precision).sum::<f64>() / k;
    let macro_r = stats.iter().map(|s| s.recall).sum::<f64>() / k;
    let macro_f = stats.iter().map(|s| s.f1).sum::<f64>() / k;
    out.push_str(&format!(
        "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
        "macro avg", macro_p, macro_r, macro_f, total
    ));

    let w = total.max(1) as f64;
    let weighted = |f: fn(&PerClassStats) -> f64| {
        stats.iter().map(|s| f(s) * s.support as f64).sum::<f64>() / w
    };
    out.push_str(&format!(
        "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}\n",
        "weighted avg",
        weighted(|s| s.precision),
        weighted(|s| s.recall),
        weighted(|s| s.f1),
        total
    ));
    out
}
