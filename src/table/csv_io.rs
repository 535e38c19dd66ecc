use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;

use crate::error::{PipelineError, PipelineResult};
use crate::fs_ops::atomic_write_with;

/// Cell text read as missing, on top of empty fields.
const NULL_MARKERS: [&str; 7] = ["NA", "NaN", "nan", "NULL", "null", "N/A", "None"];

/// Load a headered CSV file.
pub fn read_csv(path: &Path) -> PipelineResult<DataFrame> {
    let bytes = std::fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = read_csv_from_bytes(bytes, path)?;
    tracing::debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Parse headered CSV held in memory; `origin` is only used in errors.
///
/// Every row is scanned before a column type is chosen, so a column holding
/// both `75` and `75.0` reads as floats throughout.
pub fn read_csv_from_bytes(bytes: Vec<u8>, origin: &Path) -> PipelineResult<DataFrame> {
    let null_values = NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect());
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|parse| parse.with_null_values(Some(null_values.clone())))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|source| PipelineError::Csv {
            path: origin.to_path_buf(),
            source,
        })
}

/// Write a frame as headered CSV, atomically replacing `path`.
pub fn write_csv(df: &DataFrame, path: &Path) -> PipelineResult<()> {
    let mut out = df.clone();
    atomic_write_with(path, |file| {
        CsvWriter::new(file)
            .include_header(true)
            .finish(&mut out)
            .map_err(std::io::Error::other)
    })
    .map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Read the first column of a CSV file as integers (label files).
pub fn read_int_column(path: &Path) -> PipelineResult<Vec<i64>> {
    let df = read_csv(path)?;
    super::int_values(&df, &first_column(&df, path)?)
}

/// Read the first column of a CSV file as floats (probability files).
pub fn read_float_column(path: &Path) -> PipelineResult<Vec<f64>> {
    let df = read_csv(path)?;
    super::float_values(&df, &first_column(&df, path)?)
}

fn first_column(df: &DataFrame, path: &Path) -> PipelineResult<String> {
    df.get_columns()
        .first()
        .map(|c| c.name().to_string())
        .ok_or_else(|| PipelineError::value(format!("{} has no columns", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{column_names, float_values, optional_floats};
    use tempfile::tempdir;

    fn parse(text: &str) -> DataFrame {
        read_csv_from_bytes(text.as_bytes().to_vec(), Path::new("inline")).unwrap()
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let df = df!(
            "hotel" => ["City Hotel", "Resort Hotel"],
            "adr" => [75.5f64, 1.0],
            "agent" => [None, Some(9i64)]
        )
        .unwrap();
        write_csv(&df, &path).unwrap();
        let back = read_csv(&path).unwrap();
        assert!(back.equals_missing(&df), "{back:?}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_csv(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn one_type_per_column() {
        let df = parse("hotel,adr\nCity Hotel,75\nCity Hotel,75.0\n");
        assert_eq!(df.column("adr").unwrap().dtype(), &DataType::Float64);
        assert_eq!(float_values(&df, "adr").unwrap(), vec![75.0, 75.0]);
    }

    #[test]
    fn null_markers_read_as_missing() {
        let df = parse("children,agent\n0,NULL\nNA,9\n,3\n");
        assert_eq!(column_names(&df), vec!["children", "agent"]);
        assert_eq!(
            optional_floats(&df, "children").unwrap(),
            vec![Some(0.0), None, None]
        );
        assert_eq!(
            optional_floats(&df, "agent").unwrap(),
            vec![None, Some(9.0), Some(3.0)]
        );
    }

    #[test]
    fn reads_single_label_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("y.csv");
        std::fs::write(&path, "is_canceled\n0\n1\n1\n").unwrap();
        assert_eq!(read_int_column(&path).unwrap(), vec![0, 1, 1]);
    }
}
