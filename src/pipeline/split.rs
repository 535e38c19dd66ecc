use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{PipelineError, PipelineResult};
use crate::table::{int_values, take_rows};

/// Row-aligned features and integer labels.
#[derive(Debug, Clone)]
pub struct Partition {
    pub features: DataFrame,
    pub labels: Vec<i64>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn take(&self, indices: &[usize]) -> PipelineResult<Partition> {
        Ok(Partition {
            features: take_rows(&self.features, indices)?,
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        })
    }
}

/// Train partition plus an optional held-out partition.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Partition,
    pub test: Option<Partition>,
}

/// Separate `target_column` from the features and shuffle rows into train and
/// test partitions.
///
/// A `test_fraction` of exactly zero keeps every row, in order, in the train
/// partition and produces no test partition. Otherwise `ceil(fraction * n)`
/// rows from a seeded permutation form the test partition, and at least one
/// row must be left for training.
pub fn split(
    df: &DataFrame,
    target_column: &str,
    test_fraction: f64,
    seed: u64,
) -> PipelineResult<Split> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(PipelineError::value(format!(
            "test_fraction must be in [0, 1), got {test_fraction}"
        )));
    }
    let all = Partition {
        labels: int_values(df, target_column)?,
        features: df.drop(target_column)?,
    };

    if test_fraction == 0.0 {
        tracing::info!("Split {} rows with no test partition", all.len());
        return Ok(Split {
            train: all,
            test: None,
        });
    }

    let n = all.len();
    let n_test = ((test_fraction * n as f64).ceil() as usize).min(n);
    if n_test >= n {
        return Err(PipelineError::value(format!(
            "Splitting {n} rows at test_fraction {test_fraction} leaves no rows to train on"
        )));
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let (test_idx, train_idx) = order.split_at(n_test);

    let split = Split {
        train: all.take(train_idx)?,
        test: Some(all.take(test_idx)?),
    };
    tracing::info!(
        "Split {n} rows into {} train / {n_test} test (seed {seed})",
        split.train.len()
    );
    Ok(split)
}
