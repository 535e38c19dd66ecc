//! Tabular data on polars [`DataFrame`]s.
//!
//! Every column carries one inferred type. The helpers here turn name lookups
//! and numeric views into [`PipelineError`]s naming the column, so stages never
//! see a raw polars "not found".

use polars::prelude::*;

use crate::error::{PipelineError, PipelineResult};

mod csv_io;

pub use csv_io::{read_csv, read_csv_from_bytes, read_float_column, read_int_column, write_csv};

/// Column by name; an absent name is a lookup error.
pub fn column<'a>(df: &'a DataFrame, name: &str) -> PipelineResult<&'a Column> {
    df.column(name).map_err(|_| PipelineError::missing(name))
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Header in column order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

/// New frame holding only `names`, in that order.
pub fn select<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> PipelineResult<DataFrame> {
    for name in names {
        column(df, name.as_ref())?;
    }
    Ok(df.select(names.iter().map(|n| n.as_ref()))?)
}

/// New frame holding the rows at `indices`, in that order.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> PipelineResult<DataFrame> {
    let idx = indices
        .iter()
        .map(|&i| {
            IdxSize::try_from(i)
                .map_err(|_| PipelineError::value(format!("Row index {i} out of range")))
        })
        .collect::<PipelineResult<Vec<_>>>()?;
    Ok(df.take(&IdxCa::from_vec("rows".into(), idx))?)
}

/// Numeric view of a column with missing cells as `None`.
///
/// A text column is a type error naming its first value. A column with no
/// values at all reads as all missing whatever its inferred type.
pub fn optional_floats(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<f64>>> {
    let series = column(df, name)?.as_materialized_series();
    if series.null_count() == series.len() {
        return Ok(vec![None; series.len()]);
    }
    if series.dtype() == &DataType::String {
        return Err(text_error(series, name));
    }
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Numeric cells of a column; a missing cell is a value error.
pub fn float_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<f64>> {
    optional_floats(df, name)?
        .into_iter()
        .map(|v| v.ok_or_else(|| missing_values(name)))
        .collect()
}

/// Integer cells of a column; floats qualify only when integral.
pub fn int_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<i64>> {
    let series = column(df, name)?.as_materialized_series();
    if series.dtype().is_integer() {
        let ints = series.cast(&DataType::Int64)?;
        return ints
            .i64()?
            .into_iter()
            .map(|v| v.ok_or_else(|| missing_values(name)))
            .collect();
    }
    float_values(df, name)?
        .into_iter()
        .map(|v| {
            if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(PipelineError::Type {
                    column: name.to_string(),
                    value: v.to_string(),
                    expected: "integer value",
                })
            }
        })
        .collect()
}

/// Row-major `f64` matrix of `names`, in that order.
///
/// No stage downstream of cleaning can interpret a missing cell, so one is a
/// value error here.
pub fn feature_rows<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> PipelineResult<Vec<Vec<f64>>> {
    let columns = names
        .iter()
        .map(|name| float_values(df, name.as_ref()))
        .collect::<PipelineResult<Vec<_>>>()?;
    Ok((0..df.height())
        .map(|row| columns.iter().map(|values| values[row]).collect())
        .collect())
}

/// One-column frame.
pub fn single_column(name: &str, series: Series) -> PipelineResult<DataFrame> {
    Ok(DataFrame::new(vec![Column::from(series.with_name(name.into()))])?)
}

fn text_error(series: &Series, name: &str) -> PipelineError {
    let value = series
        .str()
        .ok()
        .and_then(|ca| ca.into_iter().flatten().next().map(str::to_string))
        .unwrap_or_default();
    PipelineError::Type {
        column: name.to_string(),
        value,
        expected: "numeric value",
    }
}

fn missing_values(name: &str) -> PipelineError {
    PipelineError::value(format!("Column {name} contains missing values"))
}
