//! Persisted classifier artifact.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::fs_ops::atomic_write;
use crate::ml::{Classifier, ClassifierState};

/// Current artifact layout version.
pub const MODEL_VERSION: i64 = 1;

/// A fitted classifier bound to the ordered feature list it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model_version: i64,
    pub initial_features: Vec<String>,
    pub classifier: Classifier,
}

impl TrainedModel {
    pub fn new(initial_features: Vec<String>, classifier: Classifier) -> Self {
        Self {
            model_version: MODEL_VERSION,
            initial_features,
            classifier,
        }
    }

    /// Check version, dimensions and fitted parameters.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.model_version != MODEL_VERSION {
            return Err(PipelineError::value(format!(
                "Unsupported model_version {} (expected {MODEL_VERSION})",
                self.model_version
            )));
        }
        match self.classifier.state() {
            ClassifierState::Ready => {}
            ClassifierState::NotFitted => return Err(PipelineError::NotFitted),
            ClassifierState::Invalid(reason) => {
                return Err(PipelineError::value(format!("Invalid model: {reason}")));
            }
        }
        if self.classifier.feature_len() != self.initial_features.len() {
            return Err(PipelineError::value(format!(
                "Model expects {} features but lists {}",
                self.classifier.feature_len(),
                self.initial_features.len()
            )));
        }
        Ok(())
    }

    /// Reject a caller feature list that differs from the fitted one.
    pub fn check_features<S: AsRef<str>>(&self, features: &[S]) -> PipelineResult<()> {
        let same = features.len() == self.initial_features.len()
            && features
                .iter()
                .zip(&self.initial_features)
                .all(|(a, b)| a.as_ref() == b);
        if same {
            return Ok(());
        }
        Err(PipelineError::FeatureMismatch {
            expected: self.initial_features.clone(),
            actual: features.iter().map(|f| f.as_ref().to_string()).collect(),
        })
    }

    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        atomic_write(path, &json).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved {:?} model to {}", self.classifier.kind(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        let bytes = fs::read(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_slice(&bytes).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        model.validate()?;
        tracing::debug!(
            "Loaded {:?} model with {} features from {}",
            model.classifier.kind(),
            model.initial_features.len(),
            path.display()
        );
        Ok(model)
    }
}

/// Write `model` to `path` atomically.
pub fn save_model(model: &TrainedModel, path: &Path) -> PipelineResult<()> {
    model.save(path)
}

/// Read and validate a model artifact.
pub fn load_model(path: &Path) -> PipelineResult<TrainedModel> {
    TrainedModel::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::tree::{DecisionTreeModel, TreeNode};

    fn stump() -> TrainedModel {
        TrainedModel::new(
            vec!["lead_time".into()],
            Classifier::DecisionTree(DecisionTreeModel {
                feature_len: 1,
                nodes: vec![
                    TreeNode::Split {
                        feature_index: 0,
                        threshold: 3.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf {
                        positive_fraction: 0.0,
                        samples: 4,
                    },
                    TreeNode::Leaf {
                        positive_fraction: 1.0,
                        samples: 4,
                    },
                ],
            }),
        )
    }

    #[test]
    fn save_then_load_restores_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("model.json");
        let model = stump();
        save_model(&model, &path).unwrap();
        assert_eq!(load_model(&path).unwrap(), model);
    }

    #[test]
    fn unfitted_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut model = stump();
        model.classifier = Classifier::DecisionTree(DecisionTreeModel {
            feature_len: 1,
            nodes: Vec::new(),
        });
        save_model(&model, &path).unwrap();
        assert!(matches!(load_model(&path).unwrap_err(), PipelineError::NotFitted));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut model = stump();
        model.model_version = 99;
        assert!(matches!(model.validate().unwrap_err(), PipelineError::Value(_)));
    }

    #[test]
    fn feature_list_must_match_exactly() {
        let model = stump();
        model.check_features(&["lead_time"]).unwrap();
        let err = model.check_features(&["adr"]).unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(load_model(&path).unwrap_err(), PipelineError::Json { .. }));
    }
}
