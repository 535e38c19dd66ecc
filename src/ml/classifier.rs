//! Classifier variants sharing one fit/predict surface.

use serde::{Deserialize, Serialize};

use super::logreg::{LogRegModel, LogRegOptions, train_logreg};
use super::tree::{DecisionTreeModel, TreeOptions, train_decision_tree};

/// Which classifier family the trainer fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    DecisionTree,
    LogisticRegression,
}

/// Hyperparameters for every classifier family; only the selected one is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    pub tree: TreeOptions,
    pub logreg: LogRegOptions,
}

/// A fitted binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    DecisionTree(DecisionTreeModel),
    LogisticRegression(LogRegModel),
}

/// Why a classifier cannot be used for prediction.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierState {
    Ready,
    NotFitted,
    Invalid(String),
}

impl Classifier {
    /// Fit the selected family on a row-major matrix and binary labels.
    pub fn fit(
        kind: ClassifierKind,
        x: &[Vec<f64>],
        y: &[bool],
        options: &ClassifierOptions,
        seed: u64,
    ) -> Result<Self, String> {
        match kind {
            ClassifierKind::DecisionTree => {
                train_decision_tree(x, y, &options.tree, seed).map(Classifier::DecisionTree)
            }
            ClassifierKind::LogisticRegression => {
                train_logreg(x, y, &options.logreg, seed).map(Classifier::LogisticRegression)
            }
        }
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            Classifier::DecisionTree(_) => ClassifierKind::DecisionTree,
            Classifier::LogisticRegression(_) => ClassifierKind::LogisticRegression,
        }
    }

    /// Number of features the classifier expects per row.
    pub fn feature_len(&self) -> usize {
        match self {
            Classifier::DecisionTree(model) => model.feature_len,
            Classifier::LogisticRegression(model) => model.feature_len,
        }
    }

    pub fn state(&self) -> ClassifierState {
        let (fitted, valid) = match self {
            Classifier::DecisionTree(model) => (model.is_fitted(), model.validate()),
            Classifier::LogisticRegression(model) => (model.is_fitted(), model.validate()),
        };
        match (fitted, valid) {
            (false, _) => ClassifierState::NotFitted,
            (true, Err(reason)) => ClassifierState::Invalid(reason),
            (true, Ok(())) => ClassifierState::Ready,
        }
    }

    /// Positive-class probability for one row.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        match self {
            Classifier::DecisionTree(model) => model.predict_proba(features),
            Classifier::LogisticRegression(model) => model.predict_proba(features),
        }
    }

    /// Argmax over the two classes; ties go to the negative class.
    pub fn predict_class(&self, features: &[f64]) -> i64 {
        if self.predict_proba(features) > 0.5 { 1 } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_families_fit_the_same_data() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<bool> = (0..20).map(|i| i >= 10).collect();
        for kind in [ClassifierKind::DecisionTree, ClassifierKind::LogisticRegression] {
            let model = Classifier::fit(kind, &x, &y, &ClassifierOptions::default(), 42).unwrap();
            assert_eq!(model.kind(), kind);
            assert_eq!(model.state(), ClassifierState::Ready);
            assert_eq!(model.predict_class(&[1.0]), 0);
            assert_eq!(model.predict_class(&[18.0]), 1);
        }
    }

    #[test]
    fn empty_tree_is_not_fitted() {
        let model = Classifier::DecisionTree(DecisionTreeModel {
            feature_len: 3,
            nodes: Vec::new(),
        });
        assert_eq!(model.state(), ClassifierState::NotFitted);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let model = Classifier::LogisticRegression(LogRegModel {
            feature_len: 1,
            mean: vec![0.0],
            scale: vec![1.0],
            weights: vec![0.5],
            bias: 0.0,
        });
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["kind"], "logistic_regression");
        let back: Classifier = serde_json::from_value(json).unwrap();
        assert_eq!(back, model);
    }
}
