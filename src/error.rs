//! Error handling for TOA5 header processing.
//!
//! Parse-time failures are reported as [`HeaderError`], field rule
//! violations as [`ValidationError`]. [`Toa5Error`] wraps both together with
//! the I/O, CSV and Polars errors raised when reading whole files.

use crate::models::HeaderRow;
use std::fmt;
use thiserror::Error;

/// Boxed row-level decode error coming from the row source.
pub type RowError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("unexpected end of input while reading the {row}")]
    UnexpectedEnd { row: HeaderRow },

    #[error("failed to decode the {row}: {source}")]
    RowDecode {
        row: HeaderRow,
        #[source]
        source: RowError,
    },

    #[error("not a TOA5 file? expected first field \"TOA5\", found {found:?}")]
    NotToa5 { found: Option<String> },

    #[error("TOA5 environment line length mismatch: expected 8 fields, found {found}")]
    EnvironmentLineLength { found: usize },

    #[error(
        "header column count mismatch: {names} names, {units} units, {processes} data processes"
    )]
    ColumnCountMismatch {
        names: usize,
        units: usize,
        processes: usize,
    },

    #[error("duplicate column name {name:?}")]
    DuplicateColumnName { name: String },
}

/// A single column header field that broke one of the validation rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    pub field: Field,
    pub value: String,
}

/// The three fields of a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Unit,
    Prc,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name => write!(f, "column name"),
            Field::Unit => write!(f, "unit"),
            Field::Prc => write!(f, "data process"),
        }
    }
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.field, self.value)
    }
}

/// Joins problems as `column name "1x", unit "a\\b"`.
pub(crate) fn join_problems(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unexpected {}", join_problems(.problems))]
    InvalidFields { problems: Vec<FieldProblem> },

    #[error("Column name {name:?} may not contain any of '/[]'")]
    ReservedCharacter { name: String },
}

#[derive(Error, Debug)]
pub enum Toa5Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid TOA5 header: {0}")]
    Header(#[from] HeaderError),

    #[error("Invalid column header: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transformed column name {name:?} is not unique")]
    DuplicateColumnName { name: String },
}

pub type Result<T> = std::result::Result<T, Toa5Error>;
