//! Pipeline configuration stored as TOML.
//!
//! Every section and field has a serde default, so a file only needs the keys
//! it changes. The loaded [`PipelineConfig`] is passed explicitly to each
//! step; nothing reads it from global state.
//!
//! Config keys: `split`, `train` (with `train.tree` and `train.logreg`),
//! `predict`, `store`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ml::logreg::LogRegOptions;
use crate::ml::tree::TreeOptions;
use crate::ml::{ClassifierKind, ClassifierOptions};
use crate::pipeline::{DEFAULT_INITIAL_FEATURES, TARGET_COLUMN};

mod errors;
mod io;

pub use errors::ConfigError;
pub use io::{CONFIG_FILE_NAME, config_path, load_config, load_or_default, save_config};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub split: SplitConfig,
    pub train: TrainConfig,
    pub predict: PredictConfig,
    pub store: StoreConfig,
}

impl PipelineConfig {
    /// Reject values no step can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.split.test_fraction;
        if !(0.0..1.0).contains(&fraction) {
            return Err(ConfigError::Invalid(format!(
                "split.test_fraction must be in [0, 1), got {fraction}"
            )));
        }
        if self.split.target_column.trim().is_empty() {
            return Err(ConfigError::Invalid("split.target_column is empty".into()));
        }
        if self.train.initial_features.is_empty() {
            return Err(ConfigError::Invalid("train.initial_features is empty".into()));
        }
        if self
            .train
            .initial_features
            .iter()
            .any(|f| *f == self.split.target_column)
        {
            return Err(ConfigError::Invalid(format!(
                "train.initial_features must not include the target column {}",
                self.split.target_column
            )));
        }
        if self.store.max_rows_show == 0 {
            return Err(ConfigError::Invalid("store.max_rows_show must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub target_column: String,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_fraction: 0.4,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Ordered columns the classifier is fitted on.
    pub initial_features: Vec<String>,
    pub classifier: ClassifierKind,
    pub seed: u64,
    pub tree: TreeOptions,
    pub logreg: LogRegOptions,
}

impl TrainConfig {
    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            tree: self.tree.clone(),
            logreg: self.logreg.clone(),
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            initial_features: DEFAULT_INITIAL_FEATURES.map(String::from).to_vec(),
            classifier: ClassifierKind::default(),
            seed: 42,
            tree: TreeOptions::default(),
            logreg: LogRegOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    pub model_path: PathBuf,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/model.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// Rows listed after a prediction.
    pub max_rows_show: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/bookings.db"),
            max_rows_show: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [split]
            test_fraction = 0.25

            [train]
            classifier = "logistic_regression"

            [train.tree]
            max_depth = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.split.test_fraction, 0.25);
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.split.target_column, "is_canceled");
        assert_eq!(config.train.classifier, ClassifierKind::LogisticRegression);
        assert_eq!(config.train.tree.max_depth, Some(12));
        assert_eq!(config.train.tree.min_samples_leaf, 1);
        assert_eq!(config.train.initial_features.len(), 11);
        assert_eq!(config.store.max_rows_show, 100);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let mut config = PipelineConfig::default();
        config.split.test_fraction = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_target_in_features() {
        let mut config = PipelineConfig::default();
        config.train.initial_features.push("is_canceled".into());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
