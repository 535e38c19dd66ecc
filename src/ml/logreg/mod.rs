//! Binary logistic regression over standardized feature vectors.

use serde::{Deserialize, Serialize};

mod train;
pub use train::{LogRegOptions, train_logreg};

/// Fitted logistic regression model.
///
/// Inputs are standardized with the training mean/scale before the linear
/// term, so callers always pass raw feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRegModel {
    /// Number of `f64` values per feature vector.
    pub feature_len: usize,
    /// Per-feature training mean.
    pub mean: Vec<f64>,
    /// Per-feature training standard deviation (1.0 for constant features).
    pub scale: Vec<f64>,
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogRegModel {
    /// True once weights have been learned.
    pub fn is_fitted(&self) -> bool {
        self.feature_len > 0 && !self.weights.is_empty()
    }

    /// Validate the model dimensions.
    pub fn validate(&self) -> Result<(), String> {
        let d = self.feature_len;
        if self.weights.len() != d {
            return Err("weights length mismatch".to_string());
        }
        if self.mean.len() != d || self.scale.len() != d {
            return Err("standardization length mismatch".to_string());
        }
        if self.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("scale entries must be > 0".to_string());
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err("model parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Raw logit for a feature vector.
    pub fn decision(&self, features: &[f64]) -> f64 {
        let mut sum = self.bias;
        for i in 0..self.feature_len {
            let v = features.get(i).copied().unwrap_or(0.0);
            sum += self.weights[i] * (v - self.mean[i]) / self.scale[i];
        }
        sum
    }

    /// Positive-class probability for a feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.decision(features))
    }
}

/// Numerically-stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
