//! Core data structures for TOA5 headers.
//!
//! A TOA5 header is four CSV rows: the environment line describing the
//! logger and program, followed by one row each of column names, units and
//! data processes. Missing optional values are empty strings, never `None`,
//! so a header read from text can be written back out unchanged.

use crate::error::ValidationError;
use crate::transform::ColumnTransform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal tag in the first field of every TOA5 file.
pub const TOA5_TAG: &str = "TOA5";

/// Header row 1: details about the data logger and its program
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EnvironmentLine {
    /// Station (data logger) name
    pub station_name: String,
    /// Model number of the data logger
    pub logger_model: String,
    /// Serial number of the data logger
    pub logger_serial: String,
    /// Data logger operating system and version
    pub logger_os: String,
    /// Name of the program on the data logger
    pub program_name: String,
    /// The program's signature (checksum)
    pub program_sig: String,
    /// Name of the table contained in the file
    pub table_name: String,
}

impl EnvironmentLine {
    /// The seven fields in the order they appear in the file
    pub fn fields(&self) -> [&str; 7] {
        [
            &self.station_name,
            &self.logger_model,
            &self.logger_serial,
            &self.logger_os,
            &self.program_name,
            &self.program_sig,
            &self.table_name,
        ]
    }
}

impl From<[String; 7]> for EnvironmentLine {
    fn from(fields: [String; 7]) -> Self {
        let [
            station_name,
            logger_model,
            logger_serial,
            logger_os,
            program_name,
            program_sig,
            table_name,
        ] = fields;
        Self {
            station_name,
            logger_model,
            logger_serial,
            logger_os,
            program_name,
            program_sig,
            table_name,
        }
    }
}

/// One column's name, unit and data process, as read from header rows 2-4
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColumnHeader {
    /// Column name
    pub name: String,
    /// Scientific/engineering units (optional)
    #[serde(default)]
    pub unit: String,
    /// "Data process", e.g. `Smp`, `Avg`, `Max` (optional)
    #[serde(default)]
    pub prc: String,
}

impl ColumnHeader {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, prc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            prc: prc.into(),
        }
    }

    /// Column header with empty unit and data process
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The conventional `TIMESTAMP` column, unit `TS`
    pub fn is_timestamp(&self) -> bool {
        self.name == "TIMESTAMP" && self.unit == "TS" && self.prc.is_empty()
    }

    /// The conventional `RECORD` column, unit `RN`
    pub fn is_record(&self) -> bool {
        self.name == "RECORD" && self.unit == "RN" && self.prc.is_empty()
    }
}

/// How the first column of a table can serve as its index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexHint {
    /// First column is `TIMESTAMP`/`TS`: parse as date-time and use as the index
    Timestamp,
    /// First column is `RECORD`/`RN`: use as a plain index
    Record,
}

/// A complete parsed TOA5 header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub env_line: EnvironmentLine,
    pub columns: Vec<ColumnHeader>,
}

impl Header {
    pub fn new(env_line: EnvironmentLine, columns: Vec<ColumnHeader>) -> Self {
        Self { env_line, columns }
    }

    pub fn into_parts(self) -> (EnvironmentLine, Vec<ColumnHeader>) {
        (self.env_line, self.columns)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn index_hint(&self) -> Option<IndexHint> {
        let first = self.columns.first()?;
        if first.is_timestamp() {
            Some(IndexHint::Timestamp)
        } else if first.is_record() {
            Some(IndexHint::Record)
        } else {
            None
        }
    }

    /// Apply `transform` to every column, in order
    pub fn column_names(
        &self,
        transform: &ColumnTransform,
    ) -> std::result::Result<Vec<String>, ValidationError> {
        self.columns.iter().map(|col| transform.apply(col)).collect()
    }
}

/// The four rows of a TOA5 header, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderRow {
    EnvironmentLine,
    Names,
    Units,
    Processes,
}

impl HeaderRow {
    pub const ALL: [HeaderRow; 4] = [
        HeaderRow::EnvironmentLine,
        HeaderRow::Names,
        HeaderRow::Units,
        HeaderRow::Processes,
    ];

    /// 1-based line number of the row within the file
    pub fn line(self) -> usize {
        match self {
            HeaderRow::EnvironmentLine => 1,
            HeaderRow::Names => 2,
            HeaderRow::Units => 3,
            HeaderRow::Processes => 4,
        }
    }
}

impl fmt::Display for HeaderRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            HeaderRow::EnvironmentLine => "environment line",
            HeaderRow::Names => "column names",
            HeaderRow::Units => "units",
            HeaderRow::Processes => "data processes",
        };
        write!(f, "{} (row {})", what, self.line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvironmentLine {
        EnvironmentLine::from([
            "Stn".to_string(),
            "CR1000X".to_string(),
            "12342".to_string(),
            "CR1000X.Std.03.02".to_string(),
            "CPU:Stn.CR1X".to_string(),
            "2438".to_string(),
            "Example".to_string(),
        ])
    }

    #[test]
    fn test_environment_line_field_order() {
        let env = env();
        assert_eq!(env.station_name, "Stn");
        assert_eq!(env.table_name, "Example");
        assert_eq!(
            env.fields(),
            [
                "Stn",
                "CR1000X",
                "12342",
                "CR1000X.Std.03.02",
                "CPU:Stn.CR1X",
                "2438",
                "Example"
            ]
        );
    }

    #[test]
    fn test_column_header_defaults_are_empty() {
        let col = ColumnHeader::named("BattV");
        assert_eq!(col, ColumnHeader::new("BattV", "", ""));
        assert!(col.unit.is_empty());
        assert!(col.prc.is_empty());
    }

    #[test]
    fn test_index_hint() {
        let header = Header::new(
            env(),
            vec![
                ColumnHeader::new("TIMESTAMP", "TS", ""),
                ColumnHeader::new("RECORD", "RN", ""),
            ],
        );
        assert_eq!(header.index_hint(), Some(IndexHint::Timestamp));

        let header = Header::new(env(), vec![ColumnHeader::new("RECORD", "RN", "")]);
        assert_eq!(header.index_hint(), Some(IndexHint::Record));

        let header = Header::new(env(), vec![ColumnHeader::new("TIMESTAMP", "", "")]);
        assert_eq!(header.index_hint(), None);

        let header = Header::new(env(), vec![ColumnHeader::new("RECORD", "RN", "Smp")]);
        assert_eq!(header.index_hint(), None);

        let header = Header::new(env(), Vec::new());
        assert_eq!(header.index_hint(), None);
    }

    #[test]
    fn test_header_row_display() {
        assert_eq!(HeaderRow::EnvironmentLine.to_string(), "environment line (row 1)");
        assert_eq!(HeaderRow::Processes.to_string(), "data processes (row 4)");
    }
}
