//! TOA5 Library
//!
//! A Rust library for reading and writing the header of TOA5 files, the
//! CSV-based format written by Campbell Scientific data loggers.
//!
//! A TOA5 file starts with four header rows:
//!
//! 1. the environment line ([`EnvironmentLine`]),
//! 2. the column names ([`ColumnHeader::name`]),
//! 3. the columns' units ([`ColumnHeader::unit`]),
//! 4. the columns' data processes ([`ColumnHeader::prc`]),
//!
//! followed by ordinary CSV data rows.
//!
//! This library provides tools for:
//! - Parsing and validating the header from any row source ([`read_header`])
//! - Writing the header back out ([`write_header`])
//! - Checking column header fields against the usual logger rules
//! - Deriving friendly (`BattV_Min[V]`) or SQL-safe (`battv_min`) column names
//! - Loading whole files into Polars data frames ([`read_frame`])
//!
//! ```
//! use toa5::{csv_reader_builder, read_csv_header, short_name};
//!
//! let data = "TOA5,Stn,CR1000X,12342,CR1000X.Std.03.02,CPU:Stn.CR1X,2438,Example
//! TIMESTAMP,RECORD,BattV_Min
//! TS,RN,Volts
//! ,,Min
//! 2021-06-19 00:00:00,0,12.99
//! ";
//! let mut input = data.as_bytes();
//! let header = read_csv_header(&mut input, false)?;
//! let names = header
//!     .columns
//!     .iter()
//!     .map(short_name)
//!     .collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(names, ["TIMESTAMP", "RECORD", "BattV_Min[V]"]);
//!
//! // the input is left on the data rows
//! let mut reader = csv_reader_builder().from_reader(input);
//! let first = reader.records().next().unwrap()?;
//! assert_eq!(&first[2], "12.99");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod header;
pub mod models;
pub mod transform;
pub mod validate;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{NameStyle, ReadConfig};
pub use error::{HeaderError, Result, Toa5Error, ValidationError};
pub use frame::{Toa5Frame, read_frame, read_frame_from_bytes};
pub use header::{
    csv_reader_builder, csv_writer_builder, read_csv_header, read_header, write_csv_header,
    write_header,
};
pub use models::{ColumnHeader, EnvironmentLine, Header, HeaderRow, IndexHint};
pub use transform::{
    ColumnTransform, FriendlyTransform, SHORTER_UNITS, short_name, sql_name,
};
pub use validate::validate;
