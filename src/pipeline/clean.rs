//! Raw booking table to model-ready feature table.
//!
//! Each step is a standalone value-in/value-out function; [`clean_table`]
//! chains them in the one order that keeps their dependencies intact: the
//! derived `year` column must exist before encoding, and invalid rates must be
//! gone before the log step sees them.

use std::collections::HashSet;
use std::path::Path;

use polars::prelude::*;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::{PipelineError, PipelineResult};
use crate::table::{column, has_column, optional_floats, read_csv, write_csv};

/// Columns deciding whether a row is a real booking: three occupancy counts,
/// then the average daily rate.
pub const GUARD_COLUMNS: [&str; 4] = ["adults", "children", "babies", "adr"];

/// Date column expanded into `year`, `month`, `day` and `weekday`.
pub const DATE_COLUMN: &str = "reservation_status_date";

pub const CATEGORICAL_COLUMNS: [&str; 8] = [
    "hotel",
    "meal",
    "market_segment",
    "distribution_channel",
    "reserved_room_type",
    "deposit_type",
    "customer_type",
    "year",
];

/// Right-skewed numeric columns compressed with `ln(x + 1)`.
pub const LOG_COLUMNS: [&str; 6] = [
    "lead_time",
    "arrival_date_week_number",
    "arrival_date_day_of_month",
    "agent",
    "company",
    "adr",
];

/// Leakage-prone or unused columns removed at the end of cleaning.
pub const UNUSED_COLUMNS: [&str; 8] = [
    "days_in_waiting_list",
    "arrival_date_year",
    "assigned_room_type",
    "booking_changes",
    "reservation_status",
    "country",
    "reservation_status_date",
    "arrival_date_month",
];

/// How [`drop_unused_columns`] treats names that are not in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropMode {
    /// Absent names are a lookup error.
    Strict,
    /// Absent names are skipped.
    Lenient,
}

/// Drop rows identical across every column, keeping the first occurrence.
pub fn remove_exact_duplicates(df: &DataFrame) -> PipelineResult<DataFrame> {
    let out = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    tracing::info!("Removed {} duplicate rows", df.height() - out.height());
    Ok(out)
}

/// Replace every missing cell with `value`.
///
/// Numeric columns keep their kind; text columns take the rendered number. A
/// column with no values at all becomes an integer column of `value`.
pub fn fill_missing(df: &DataFrame, value: i64) -> PipelineResult<DataFrame> {
    let mut out = df.clone();
    let mut filled = 0usize;
    for col in df.get_columns() {
        let nulls = col.null_count();
        if nulls == 0 {
            continue;
        }
        let name = col.name().clone();
        let series = col.as_materialized_series();
        let replaced = if nulls == series.len() {
            Series::new(name, vec![value; series.len()])
        } else if series.dtype().is_integer() {
            let ints = series.cast(&DataType::Int64)?;
            let values: Vec<i64> = ints.i64()?.into_iter().map(|v| v.unwrap_or(value)).collect();
            Series::new(name, values)
        } else if series.dtype().is_float() {
            let floats = series.cast(&DataType::Float64)?;
            let values: Vec<f64> = floats
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(value as f64))
                .collect();
            Series::new(name, values)
        } else if series.dtype() == &DataType::String {
            let text = value.to_string();
            let values: Vec<&str> = series
                .str()?
                .into_iter()
                .map(|v| v.unwrap_or(text.as_str()))
                .collect();
            Series::new(name, values)
        } else {
            return Err(PipelineError::Type {
                column: name.to_string(),
                value: series.dtype().to_string(),
                expected: "numeric or text column",
            });
        };
        out.with_column(replaced)?;
        filled += nulls;
    }
    tracing::info!("Filled {filled} missing cells with {value}");
    Ok(out)
}

/// Remove rows with no occupants or a non-positive rate.
///
/// `guard_columns` must name exactly four columns: three occupancy counts and
/// the rate. Any absent guard column is a lookup error.
pub fn drop_invalid_rows<S: AsRef<str>>(
    df: &DataFrame,
    guard_columns: &[S],
) -> PipelineResult<DataFrame> {
    let [adults, children, babies, rate] = guard_columns else {
        return Err(PipelineError::value(format!(
            "Expected 4 guard columns, got {}",
            guard_columns.len()
        )));
    };
    let names = [adults, children, babies, rate].map(|c| c.as_ref());
    // Every column is read before filtering so a bad one fails the whole step.
    let guards = names
        .iter()
        .map(|name| optional_floats(df, name))
        .collect::<PipelineResult<Vec<_>>>()?;

    let is_zero = |v: Option<f64>| v == Some(0.0);
    let keep: Vec<bool> = (0..df.height())
        .map(|row| {
            let unoccupied = guards[..3].iter().all(|g| is_zero(g[row]));
            let priced = guards[3][row].is_some_and(|v| v > 0.0);
            !unoccupied && priced
        })
        .collect();
    let out = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
    tracing::info!(
        "Dropped {} rows failing guard columns {names:?}",
        df.height() - out.height()
    );
    Ok(out)
}

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const ISO_DATE_LOOSE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month padding:none]-[day padding:none]");
const US_DATE: &[BorrowedFormatItem<'static>] = format_description!("[month]/[day]/[year]");
const US_DATE_LOOSE: &[BorrowedFormatItem<'static>] =
    format_description!("[month padding:none]/[day padding:none]/[year]");

/// Parse `YYYY-MM-DD` or `M/D/YYYY`, ignoring any time-of-day suffix.
pub fn parse_date(raw: &str) -> Option<Date> {
    let date_part = raw.trim().split([' ', 'T']).next()?;
    [ISO_DATE, ISO_DATE_LOOSE, US_DATE, US_DATE_LOOSE]
        .into_iter()
        .find_map(|format| Date::parse(date_part, format).ok())
}

/// Parse `date_column` and append `year`, `month`, `day` and `weekday`
/// (Monday = 0).
///
/// The date column itself is rewritten to ISO text. Unparsable cells are a
/// value error.
pub fn derive_datetime_fields(df: &DataFrame, date_column: &str) -> PipelineResult<DataFrame> {
    let series = column(df, date_column)?.as_materialized_series();
    let unparsable = |raw: Option<&str>| {
        PipelineError::value(format!(
            "Column {date_column} has unparsable date {:?}",
            raw.unwrap_or_default()
        ))
    };
    let text = series.str().map_err(|_| unparsable(None))?;
    let dates = text
        .into_iter()
        .map(|raw| raw.and_then(parse_date).ok_or_else(|| unparsable(raw)))
        .collect::<PipelineResult<Vec<Date>>>()?;

    let mut out = df.clone();
    let iso: Vec<String> = dates.iter().map(Date::to_string).collect();
    out.with_column(Series::new(date_column.into(), iso))?;
    let derived: [(&str, fn(&Date) -> i64); 4] = [
        ("year", |d| d.year() as i64),
        ("month", |d| u8::from(d.month()) as i64),
        ("day", |d| d.day() as i64),
        ("weekday", |d| d.weekday().number_days_from_monday() as i64),
    ];
    for (name, extract) in derived {
        let values: Vec<i64> = dates.iter().map(extract).collect();
        out.with_column(Series::new(name.into(), values))?;
    }
    tracing::info!("Derived year/month/day/weekday from {date_column}");
    Ok(out)
}

/// Dense integer codes for a column's distinct values, in sorted value order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Labels,
}

#[derive(Debug, Clone, PartialEq)]
enum Labels {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Labels {
    fn read(col: &Column) -> PipelineResult<Self> {
        let series = col.as_materialized_series();
        if series.null_count() > 0 {
            return Err(PipelineError::value(format!(
                "Column {} has missing labels",
                col.name()
            )));
        }
        if series.dtype() == &DataType::String {
            let text = series.str()?;
            return Ok(Labels::Text(
                text.into_no_null_iter().map(str::to_string).collect(),
            ));
        }
        let floats = series.cast(&DataType::Float64)?;
        // `+ 0.0` folds -0.0 into 0.0.
        Ok(Labels::Numeric(
            floats.f64()?.into_no_null_iter().map(|v| v + 0.0).collect(),
        ))
    }
}

impl LabelEncoder {
    /// Learn the sorted distinct values of `col`.
    pub fn fit(col: &Column) -> PipelineResult<Self> {
        let classes = match Labels::read(col)? {
            Labels::Numeric(mut values) => {
                values.sort_by(f64::total_cmp);
                values.dedup();
                Labels::Numeric(values)
            }
            Labels::Text(mut values) => {
                values.sort();
                values.dedup();
                Labels::Text(values)
            }
        };
        Ok(Self { classes })
    }

    /// Distinct values in code order, rendered as text.
    pub fn classes(&self) -> Vec<String> {
        match &self.classes {
            Labels::Numeric(values) => values.iter().map(f64::to_string).collect(),
            Labels::Text(values) => values.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.classes {
            Labels::Numeric(values) => values.len(),
            Labels::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Codes for `col`; a value not seen during fitting is a value error.
    pub fn transform(&self, col: &Column) -> PipelineResult<Vec<i64>> {
        let name = col.name().as_str();
        let unseen =
            |label: String| PipelineError::value(format!("Column {name} has unseen label {label}"));
        match (&self.classes, Labels::read(col)?) {
            (Labels::Numeric(classes), Labels::Numeric(values)) => values
                .iter()
                .map(|v| {
                    classes
                        .binary_search_by(|c| c.total_cmp(v))
                        .map(|idx| idx as i64)
                        .map_err(|_| unseen(v.to_string()))
                })
                .collect(),
            (Labels::Text(classes), Labels::Text(values)) => values
                .into_iter()
                .map(|v| match classes.binary_search(&v) {
                    Ok(idx) => Ok(idx as i64),
                    Err(_) => Err(unseen(v)),
                })
                .collect(),
            _ => Err(PipelineError::Type {
                column: name.to_string(),
                value: col.dtype().to_string(),
                expected: "labels of the fitted kind",
            }),
        }
    }
}

/// Replace each named column's values with their [`LabelEncoder`] codes.
pub fn encode_categoricals<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
) -> PipelineResult<DataFrame> {
    let mut out = df.clone();
    for name in columns {
        let name = name.as_ref();
        let col = column(&out, name)?;
        let encoder = LabelEncoder::fit(col)?;
        let codes = encoder.transform(col)?;
        out.with_column(Series::new(name.into(), codes))?;
        tracing::debug!("Encoded {name} into {} codes", encoder.len());
    }
    tracing::info!("Encoded {} categorical columns", columns.len());
    Ok(out)
}

/// `ln(x + 1)`, defined only for `x > -1`.
///
/// Shared by batch cleaning and single-record prediction so both paths
/// transform identically.
pub fn log1p_checked(column: &str, x: f64) -> PipelineResult<f64> {
    if !x.is_finite() || x <= -1.0 {
        return Err(PipelineError::value(format!(
            "Column {column} has value {x} outside the log transform domain (> -1)"
        )));
    }
    Ok(x.ln_1p())
}

/// Apply [`log1p_checked`] to every numeric cell of the named columns.
///
/// Missing cells pass through; text columns are a type error.
pub fn log_transform<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> PipelineResult<DataFrame> {
    let mut out = df.clone();
    for name in columns {
        let name = name.as_ref();
        let logged = optional_floats(&out, name)?
            .into_iter()
            .map(|v| v.map(|x| log1p_checked(name, x)).transpose())
            .collect::<PipelineResult<Vec<Option<f64>>>>()?;
        out.with_column(Series::new(name.into(), logged))?;
    }
    tracing::info!("Log-transformed {} columns", columns.len());
    Ok(out)
}

/// Remove the named columns. Repeated names are removed once.
pub fn drop_unused_columns<S: AsRef<str>>(
    df: &DataFrame,
    columns: &[S],
    mode: DropMode,
) -> PipelineResult<DataFrame> {
    let mut out = df.clone();
    let mut seen = HashSet::new();
    for name in columns {
        let name = name.as_ref();
        if !seen.insert(name) {
            continue;
        }
        if has_column(&out, name) {
            out = out.drop(name)?;
            continue;
        }
        match mode {
            DropMode::Strict => return Err(PipelineError::missing(name)),
            DropMode::Lenient => tracing::debug!("Column {name} not present; skipping drop"),
        }
    }
    tracing::info!("Dropped {} columns", df.width() - out.width());
    Ok(out)
}

/// Run every cleaning step, in order, on an in-memory raw frame.
pub fn clean_table(raw: &DataFrame) -> PipelineResult<DataFrame> {
    let df = remove_exact_duplicates(raw)?;
    let df = fill_missing(&df, 0)?;
    let df = drop_invalid_rows(&df, &GUARD_COLUMNS)?;
    let df = derive_datetime_fields(&df, DATE_COLUMN)?;
    let df = encode_categoricals(&df, &CATEGORICAL_COLUMNS)?;
    let df = log_transform(&df, &LOG_COLUMNS)?;
    drop_unused_columns(&df, &UNUSED_COLUMNS, DropMode::Strict)
}

/// Read raw CSV from `input`, clean it, write the result to `output`.
pub fn get_clean_data(input: &Path, output: &Path) -> PipelineResult<DataFrame> {
    tracing::info!("Cleaning {}", input.display());
    let raw = read_csv(input)?;
    let cleaned = clean_table(&raw)?;
    write_csv(&cleaned, output)?;
    tracing::info!(
        "Cleaned {} raw rows into {} rows x {} columns at {}",
        raw.height(),
        cleaned.height(),
        cleaned.width(),
        output.display()
    );
    Ok(cleaned)
}
