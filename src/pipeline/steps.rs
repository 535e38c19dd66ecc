//! File-backed pipeline steps with explicit input/output path lists.

use std::fmt;
use std::path::{Path, PathBuf};

use polars::prelude::{NamedFrom, Series};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::table::{read_csv, single_column, write_csv};

use super::split::Partition;
use super::{Input, evaluate, fit, get_clean_data, score, split};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Step {
    /// `[raw.csv]` -> `[clean.csv]`
    Clean,
    /// `[clean.csv]` -> `[model.json, x_train.csv, y_train.csv, x_test.csv, y_test.csv]`
    Train,
    /// `[x_test.csv, model.json]` -> `[probabilities.csv, predictions.csv]`
    Score,
    /// `[y_test.csv, probabilities.csv, predictions.csv]` -> `[metrics.json]`
    Evaluate,
}

impl Step {
    /// Required `(inputs, outputs)` path counts.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Step::Clean => (1, 1),
            Step::Train => (1, 5),
            Step::Score => (2, 2),
            Step::Evaluate => (3, 1),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Clean => "clean",
            Step::Train => "train",
            Step::Score => "score",
            Step::Evaluate => "evaluate",
        })
    }
}

/// Run one step reading `inputs` and writing `outputs`.
pub fn run_step(
    step: Step,
    inputs: &[PathBuf],
    outputs: &[PathBuf],
    config: &PipelineConfig,
) -> PipelineResult<()> {
    let (n_in, n_out) = step.arity();
    if inputs.len() != n_in || outputs.len() != n_out {
        return Err(PipelineError::value(format!(
            "Step {step} takes {n_in} input and {n_out} output paths, got {} and {}",
            inputs.len(),
            outputs.len()
        )));
    }
    tracing::info!("Running step {step}");
    match step {
        Step::Clean => get_clean_data(&inputs[0], &outputs[0]).map(|_| ()),
        Step::Train => run_train(&inputs[0], outputs, config),
        Step::Score => {
            let predictions = score(
                Input::path(&inputs[0]),
                Input::path(&inputs[1]),
                &config.train.initial_features,
            )?;
            write_csv(&predictions.probability_table()?, &outputs[0])?;
            write_csv(&predictions.label_table()?, &outputs[1])
        }
        Step::Evaluate => {
            let evaluation = evaluate(
                Input::path(&inputs[0]),
                Input::path(&inputs[1]),
                Input::path(&inputs[2]),
            )?;
            evaluation.save(&outputs[0])
        }
    }
}

fn run_train(input: &Path, outputs: &[PathBuf], config: &PipelineConfig) -> PipelineResult<()> {
    let cleaned = read_csv(input)?;
    let parts = split(
        &cleaned,
        &config.split.target_column,
        config.split.test_fraction,
        config.split.seed,
    )?;
    let model = fit(
        &parts.train.features,
        &parts.train.labels,
        &config.train.initial_features,
        config.train.seed,
        config.train.classifier,
        &config.train.classifier_options(),
    )?;
    model.save(&outputs[0])?;
    write_partition(&parts.train, &config.split.target_column, &outputs[1], &outputs[2])?;
    match &parts.test {
        Some(test) => write_partition(test, &config.split.target_column, &outputs[3], &outputs[4]),
        None => {
            tracing::warn!(
                "No test partition; skipping {} and {}",
                outputs[3].display(),
                outputs[4].display()
            );
            Ok(())
        }
    }
}

fn write_partition(
    partition: &Partition,
    target_column: &str,
    features_path: &Path,
    labels_path: &Path,
) -> PipelineResult<()> {
    write_csv(&partition.features, features_path)?;
    let labels = single_column(
        target_column,
        Series::new(target_column.into(), partition.labels.as_slice()),
    )?;
    write_csv(&labels, labels_path)
}
