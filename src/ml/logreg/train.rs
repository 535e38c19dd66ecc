use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::{LogRegModel, sigmoid};

/// Training options for the logistic regression classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRegOptions {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub batch_size: usize,
    /// Weight each class inversely to its frequency.
    pub balance_classes: bool,
}

impl Default for LogRegOptions {
    fn default() -> Self {
        Self {
            epochs: 50,
            learning_rate: 0.1,
            l2: 1e-4,
            batch_size: 64,
            balance_classes: false,
        }
    }
}

/// Fit a binary logistic regression with mini-batch gradient descent.
///
/// `seed` drives weight initialization and the per-epoch batch shuffle.
pub fn train_logreg(
    x: &[Vec<f64>],
    y: &[bool],
    options: &LogRegOptions,
    seed: u64,
) -> Result<LogRegModel, String> {
    if x.is_empty() || y.is_empty() {
        return Err("Empty training set".to_string());
    }
    if x.len() != y.len() {
        return Err("Mismatched training inputs/labels".to_string());
    }
    let dim = x[0].len();
    if dim == 0 {
        return Err("Training rows have no features".to_string());
    }
    for row in x {
        if row.len() != dim {
            return Err("Inconsistent feature row length".to_string());
        }
    }

    let (mean, scale) = standardization(x, dim);
    let standardized: Vec<Vec<f64>> = x
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, v)| (v - mean[i]) / scale[i])
                .collect()
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut weights: Vec<f64> = (0..dim)
        .map(|_| (rng.random::<f64>() - 0.5) * 0.01)
        .collect();
    let mut bias = 0.0f64;

    let positives = y.iter().filter(|&&label| label).count() as f64;
    let negatives = y.len() as f64 - positives;
    let class_weight = |label: bool| -> f64 {
        if !options.balance_classes {
            return 1.0;
        }
        let count = if label { positives } else { negatives };
        if count == 0.0 {
            0.0
        } else {
            y.len() as f64 / (2.0 * count)
        }
    };

    let mut indices: Vec<usize> = (0..x.len()).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);

    for _epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            let mut grad_w = vec![0.0f64; dim];
            let mut grad_b = 0.0f64;
            let mut batch_weight = 0.0f64;
            for &idx in chunk {
                let weight = class_weight(y[idx]);
                if weight == 0.0 {
                    continue;
                }
                let row = &standardized[idx];
                let mut z = bias;
                for i in 0..dim {
                    z += weights[i] * row[i];
                }
                let diff = sigmoid(z) - if y[idx] { 1.0 } else { 0.0 };
                for i in 0..dim {
                    grad_w[i] += diff * row[i] * weight;
                }
                grad_b += diff * weight;
                batch_weight += weight;
            }
            if batch_weight == 0.0 {
                continue;
            }
            let inv = 1.0 / batch_weight;
            for i in 0..dim {
                weights[i] -= lr * (grad_w[i] * inv + l2 * weights[i]);
            }
            bias -= lr * grad_b * inv;
        }
    }

    let model = LogRegModel {
        feature_len: dim,
        mean,
        scale,
        weights,
        bias,
    };
    model.validate()?;
    Ok(model)
}

fn standardization(x: &[Vec<f64>], dim: usize) -> (Vec<f64>, Vec<f64>) {
    let n = x.len() as f64;
    let mut mean = vec![0.0f64; dim];
    for row in x {
        for (i, v) in row.iter().enumerate() {
            mean[i] += v / n;
        }
    }
    let mut var = vec![0.0f64; dim];
    for row in x {
        for (i, v) in row.iter().enumerate() {
            var[i] += (v - mean[i]).powi(2) / n;
        }
    }
    let scale = var
        .into_iter()
        .map(|v| {
            let s = v.sqrt();
            if s.is_finite() && s > 1e-12 { s } else { 1.0 }
        })
        .collect();
    (mean, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learns_a_linearly_separable_split() {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, 3.0]).collect();
        let y: Vec<bool> = (0..40).map(|i| i >= 20).collect();
        let model = train_logreg(&x, &y, &LogRegOptions::default(), 42).unwrap();
        assert!(model.predict_proba(&[2.0, 3.0]) < 0.5);
        assert!(model.predict_proba(&[37.0, 3.0]) > 0.5);
        // Constant feature keeps a unit scale.
        assert_eq!(model.scale[1], 1.0);
    }

    #[test]
    fn seed_makes_training_reproducible() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![(i % 6) as f64, (i % 4) as f64]).collect();
        let y: Vec<bool> = (0..30).map(|i| i % 3 == 0).collect();
        let options = LogRegOptions::default();
        let a = train_logreg(&x, &y, &options, 9).unwrap();
        let b = train_logreg(&x, &y, &options, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn balancing_pulls_the_boundary_toward_the_majority_class() {
        let x: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64]).collect();
        let y: Vec<bool> = (0..100).map(|i| i >= 90).collect();
        let plain = train_logreg(&x, &y, &LogRegOptions::default(), 5).unwrap();
        let balanced = LogRegOptions {
            balance_classes: true,
            ..LogRegOptions::default()
        };
        let balanced = train_logreg(&x, &y, &balanced, 5).unwrap();

        assert!(balanced.predict_proba(&[85.0]) > plain.predict_proba(&[85.0]));
        let mean = |model: &LogRegModel| {
            x.iter().map(|row| model.predict_proba(row)).sum::<f64>() / x.len() as f64
        };
        assert!(mean(&balanced) > mean(&plain));
        assert!(balanced.predict_proba(&[99.0]) > 0.5);
        assert!(balanced.predict_proba(&[0.0]) < 0.5);
    }

    #[test]
    fn rejects_ragged_rows() {
        let x = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(train_logreg(&x, &[true, false], &LogRegOptions::default(), 0).is_err());
    }
}
