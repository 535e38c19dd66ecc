use polars::prelude::DataFrame;

use crate::error::{PipelineError, PipelineResult};
use crate::ml::{Classifier, ClassifierKind, ClassifierOptions};
use crate::table::feature_rows;

use super::model::TrainedModel;

/// Convert integer labels to the binary form the classifiers train on.
pub(crate) fn binary_labels(labels: &[i64]) -> PipelineResult<Vec<bool>> {
    labels
        .iter()
        .map(|&label| match label {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(PipelineError::value(format!(
                "Labels must be 0 or 1, found {other}"
            ))),
        })
        .collect()
}

/// Fit `kind` on the `initial_features` columns of `features`.
pub fn fit<S: AsRef<str>>(
    features: &DataFrame,
    labels: &[i64],
    initial_features: &[S],
    seed: u64,
    kind: ClassifierKind,
    options: &ClassifierOptions,
) -> PipelineResult<TrainedModel> {
    if initial_features.is_empty() {
        return Err(PipelineError::value("initial_features is empty"));
    }
    if features.height() != labels.len() {
        return Err(PipelineError::value(format!(
            "{} feature rows but {} labels",
            features.height(),
            labels.len()
        )));
    }
    if labels.is_empty() {
        return Err(PipelineError::value("Cannot train on an empty partition"));
    }
    let x = feature_rows(features, initial_features)?;
    let y = binary_labels(labels)?;

    tracing::info!(
        "Training {kind:?} on {} rows x {} features (seed {seed})",
        x.len(),
        initial_features.len()
    );
    let classifier = Classifier::fit(kind, &x, &y, options, seed).map_err(PipelineError::Value)?;
    let names = initial_features
        .iter()
        .map(|f| f.as_ref().to_string())
        .collect();
    let model = TrainedModel::new(names, classifier);
    model.validate()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn features() -> DataFrame {
        df!(
            "lead_time" => (0..12i64).collect::<Vec<_>>(),
            "hotel" => (0..12i64).map(|i| i % 2).collect::<Vec<_>>(),
            "note" => vec!["x"; 12]
        )
        .unwrap()
    }

    fn labels() -> Vec<i64> {
        (0..12).map(|i| i64::from(i >= 6)).collect()
    }

    #[test]
    fn fits_selected_features_only() {
        let model = fit(
            &features(),
            &labels(),
            &["lead_time", "hotel"],
            42,
            ClassifierKind::DecisionTree,
            &ClassifierOptions::default(),
        )
        .unwrap();
        assert_eq!(model.initial_features, vec!["lead_time", "hotel"]);
        assert_eq!(model.classifier.predict_class(&[10.0, 0.0]), 1);
        assert_eq!(model.classifier.predict_class(&[1.0, 1.0]), 0);
    }

    #[test]
    fn text_feature_is_type_error() {
        let err = fit(
            &features(),
            &labels(),
            &["note"],
            0,
            ClassifierKind::LogisticRegression,
            &ClassifierOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Type { .. }));
    }

    #[test]
    fn missing_feature_is_lookup_error() {
        let err = fit(
            &features(),
            &labels(),
            &["adr"],
            0,
            ClassifierKind::DecisionTree,
            &ClassifierOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn non_binary_labels_are_rejected() {
        let mut y = labels();
        y[0] = 2;
        let err = fit(
            &features(),
            &y,
            &["lead_time"],
            0,
            ClassifierKind::DecisionTree,
            &ClassifierOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Value(_)));
    }
}
