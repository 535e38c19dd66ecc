use polars::prelude::*;

use crate::error::PipelineResult;
use crate::table::{feature_rows, single_column};

use super::input::Input;
use super::model::TrainedModel;

/// Per-row positive-class probability and predicted label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predictions {
    pub probabilities: Vec<f64>,
    pub labels: Vec<i64>,
}

impl Predictions {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// One-column `probability` frame.
    pub fn probability_table(&self) -> PipelineResult<DataFrame> {
        single_column(
            "probability",
            Series::new("probability".into(), self.probabilities.as_slice()),
        )
    }

    /// One-column `prediction` frame.
    pub fn label_table(&self) -> PipelineResult<DataFrame> {
        single_column(
            "prediction",
            Series::new("prediction".into(), self.labels.as_slice()),
        )
    }
}

/// Score every row of `features` with `model`.
///
/// `initial_features` must equal the list the model was fitted on.
pub fn score<S: AsRef<str>>(
    features: Input<DataFrame>,
    model: Input<TrainedModel>,
    initial_features: &[S],
) -> PipelineResult<Predictions> {
    let model = model.resolve()?;
    model.validate()?;
    model.check_features(initial_features)?;
    let features = features.resolve()?;
    let rows = feature_rows(&features, initial_features)?;

    let mut predictions = Predictions {
        probabilities: Vec::with_capacity(rows.len()),
        labels: Vec::with_capacity(rows.len()),
    };
    for row in &rows {
        predictions
            .probabilities
            .push(model.classifier.predict_proba(row));
        predictions.labels.push(model.classifier.predict_class(row));
    }
    tracing::info!(
        "Scored {} rows; {} predicted positive",
        predictions.len(),
        predictions.labels.iter().filter(|&&l| l == 1).count()
    );
    Ok(predictions)
}
