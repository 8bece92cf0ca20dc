//! Loading TOA5 files into Polars data frames.
//!
//! The header is parsed with [`read_csv_header`], the transformed names
//! become the frame's column labels, and everything after the header rows
//! is handed to the Polars CSV reader unchanged.

use crate::config::ReadConfig;
use crate::error::{Result, Toa5Error};
use crate::header::{first_duplicate, read_csv_header};
use crate::models::{ColumnHeader, EnvironmentLine, IndexHint};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// A TOA5 table loaded into a data frame
#[derive(Debug, Clone)]
pub struct Toa5Frame {
    pub env_line: EnvironmentLine,
    pub columns: Vec<ColumnHeader>,
    pub index_hint: Option<IndexHint>,
    /// Label of the index column, when the first column can serve as one
    pub index_column: Option<String>,
    pub data: DataFrame,
}

/// Read a TOA5 file from disk
pub fn read_frame(path: &Path, config: &ReadConfig) -> Result<Toa5Frame> {
    debug!("Reading TOA5 file: {}", path.display());
    let bytes = std::fs::read(path)?;
    read_frame_from_bytes(bytes, config)
}

/// Read a TOA5 file already held in memory
pub fn read_frame_from_bytes(bytes: Vec<u8>, config: &ReadConfig) -> Result<Toa5Frame> {
    let mut rest = bytes.as_slice();
    let header = read_csv_header(&mut rest, config.allow_duplicate_names)?;
    let data_start = bytes.len() - rest.len();

    let names = header.column_names(&config.transform())?;
    ensure_unique(&names)?;

    let index_hint = header.index_hint();
    let parse_dates = config.parse_timestamps && index_hint == Some(IndexHint::Timestamp);

    // blank lines before the first data row
    let mut body = bytes;
    let line_breaks = body[data_start..]
        .iter()
        .take_while(|b| matches!(b, b'\r' | b'\n'))
        .count();
    body.drain(..data_start + line_breaks);

    let data = if body.iter().all(u8::is_ascii_whitespace) {
        empty_frame(&names, parse_dates)?
    } else {
        let null_values = NullValues::AllColumns(
            config
                .missing_values
                .iter()
                .map(|value| PlSmallStr::from(value.as_str()))
                .collect(),
        );
        let mut df = CsvReadOptions::default()
            .with_has_header(false)
            .map_parse_options(|opts| opts.with_null_values(Some(null_values.clone())))
            .into_reader_with_file_handle(Cursor::new(body))
            .finish()?;
        df.set_column_names(names.iter().map(String::as_str))?;
        if parse_dates {
            parse_timestamp_column(&mut df, &names[0])?;
        }
        df
    };

    debug!(
        "Loaded table {:?}: {} rows x {} columns",
        header.env_line.table_name,
        data.height(),
        data.width()
    );

    let (env_line, columns) = header.into_parts();
    Ok(Toa5Frame {
        env_line,
        columns,
        index_hint,
        index_column: index_hint.and_then(|_| names.first().cloned()),
        data,
    })
}

/// Convert the `TIMESTAMP` column from text to date-time.
///
/// Only this column is converted; other text columns such as the times of
/// extremes (`AirT_TMx`) stay strings.
fn parse_timestamp_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let column = df.column(name)?;
    if column.dtype() != &DataType::String {
        return Ok(());
    }
    let text: &StringChunked = column.str()?;
    let ambiguous = StringChunked::full("ambiguous".into(), "raise", text.len());
    let parsed = text.as_datetime(
        None,
        TimeUnit::Microseconds,
        true,
        false,
        None,
        &ambiguous,
    )?;
    df.replace(name, parsed.into_series())?;
    debug!("Parsed column {:?} as date-time", name);
    Ok(())
}

/// Transformed names must be usable as frame columns
fn ensure_unique(names: &[String]) -> Result<()> {
    match first_duplicate(names) {
        Some(name) => Err(Toa5Error::DuplicateColumnName { name: name.clone() }),
        None => Ok(()),
    }
}

/// Frame with no rows for a file that ends after its header
fn empty_frame(names: &[String], timestamp_index: bool) -> Result<DataFrame> {
    let columns = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let dtype = if i == 0 && timestamp_index {
                DataType::Datetime(TimeUnit::Microseconds, None)
            } else {
                DataType::String
            };
            Column::new_empty(name.as_str().into(), &dtype)
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}
