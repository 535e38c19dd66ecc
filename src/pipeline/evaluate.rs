use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::fs_ops::atomic_write;
use crate::ml::metrics::{
    ConfusionMatrix, accuracy, classification_report, f1_score, precision_recall_by_class,
    roc_auc,
};

use super::input::Input;
use super::train::binary_labels;

/// Summary of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub auc: f64,
    pub accuracy: f64,
    /// F1 of the positive (cancelled) class.
    pub f1: f64,
    pub confusion: ConfusionMatrix,
    pub report: String,
}

impl Evaluation {
    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        atomic_write(path, &json).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Compare predictions against true labels.
pub fn evaluate(
    true_labels: Input<Vec<i64>>,
    probabilities: Input<Vec<f64>>,
    predicted: Input<Vec<i64>>,
) -> PipelineResult<Evaluation> {
    let truth = true_labels.resolve()?;
    let probabilities = probabilities.resolve()?;
    let predicted = predicted.resolve()?;

    if truth.is_empty() {
        return Err(PipelineError::value("Cannot evaluate an empty label set"));
    }
    if truth.len() != probabilities.len() || truth.len() != predicted.len() {
        return Err(PipelineError::value(format!(
            "Length mismatch: {} labels, {} probabilities, {} predictions",
            truth.len(),
            probabilities.len(),
            predicted.len()
        )));
    }
    if let Some(p) = probabilities.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(PipelineError::value(format!(
            "Probabilities must lie in [0, 1], found {p}"
        )));
    }
    let truth = binary_labels(&truth)?;
    let predicted = binary_labels(&predicted)?;

    let auc = roc_auc(&truth, &probabilities).ok_or_else(|| {
        PipelineError::value("AUC is undefined when only one class is present in the labels")
    })?;
    let as_index = |labels: &[bool]| labels.iter().map(|&b| usize::from(b)).collect::<Vec<_>>();
    let confusion = ConfusionMatrix::from_labels(2, &as_index(&truth), &as_index(&predicted));
    let positive = &precision_recall_by_class(&confusion)[1];
    let f1 = f1_score(positive.precision, positive.recall);
    let report = classification_report(&confusion, &["0".to_string(), "1".to_string()]);
    let evaluation = Evaluation {
        auc,
        accuracy: accuracy(&confusion),
        f1,
        confusion,
        report,
    };

    tracing::info!(
        "Evaluation: auc={:.4} accuracy={:.4} f1={:.4}",
        evaluation.auc,
        evaluation.accuracy,
        evaluation.f1
    );
    tracing::info!(
        "Confusion matrix [[tn, fp], [fn, tp]]: [[{}, {}], [{}, {}]]",
        evaluation.confusion.get(0, 0),
        evaluation.confusion.get(0, 1),
        evaluation.confusion.get(1, 0),
        evaluation.confusion.get(1, 1)
    );
    tracing::info!("Classification report:\n{}", evaluation.report);
    Ok(evaluation)
}
