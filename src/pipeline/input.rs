use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

use crate::error::PipelineResult;
use crate::table::{read_csv, read_float_column, read_int_column};

use super::model::TrainedModel;

/// A stage argument that is either already in memory or still on disk.
#[derive(Debug, Clone)]
pub enum Input<T> {
    Value(T),
    Path(PathBuf),
}

impl<T> Input<T> {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Input::Path(path.into())
    }

    fn resolve_with(self, load: impl FnOnce(&Path) -> PipelineResult<T>) -> PipelineResult<T> {
        match self {
            Input::Value(value) => Ok(value),
            Input::Path(path) => load(&path),
        }
    }
}

impl<T> From<T> for Input<T> {
    fn from(value: T) -> Self {
        Input::Value(value)
    }
}

impl Input<DataFrame> {
    pub fn resolve(self) -> PipelineResult<DataFrame> {
        self.resolve_with(read_csv)
    }
}

impl Input<TrainedModel> {
    pub fn resolve(self) -> PipelineResult<TrainedModel> {
        self.resolve_with(TrainedModel::load)
    }
}

impl Input<Vec<i64>> {
    pub fn resolve(self) -> PipelineResult<Vec<i64>> {
        self.resolve_with(read_int_column)
    }
}

impl Input<Vec<f64>> {
    pub fn resolve(self) -> PipelineResult<Vec<f64>> {
        self.resolve_with(read_float_column)
    }
}
