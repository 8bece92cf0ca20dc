//! TOA5 header parsing and serialization.
//!
//! [`read_header`] consumes exactly the four header rows from a row source
//! and leaves it positioned on the first data row, so the caller can keep
//! reading data from the same source. [`write_header`] is the inverse.
//!
//! The row source is any iterator of `Result<row, error>`. [`read_csv_header`]
//! feeds it one physical line at a time from a buffered reader, so blank
//! lines inside the header are seen as empty rows instead of being skipped.

use crate::error::{HeaderError, Result, RowError};
use crate::models::{ColumnHeader, EnvironmentLine, Header, HeaderRow, TOA5_TAG};
use std::collections::HashSet;
use std::io;
use tracing::debug;

/// Length of the environment line: the tag plus seven fields
const ENV_LINE_LEN: usize = 8;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read the next header row, mapping end of input and decode errors
fn next_row<I, R, S, E>(rows: &mut I, row: HeaderRow) -> std::result::Result<Vec<String>, HeaderError>
where
    I: Iterator<Item = std::result::Result<R, E>>,
    R: IntoIterator<Item = S>,
    S: Into<String>,
    E: Into<RowError>,
{
    match rows.next() {
        None => Err(HeaderError::UnexpectedEnd { row }),
        Some(Err(e)) => Err(HeaderError::RowDecode {
            row,
            source: e.into(),
        }),
        Some(Ok(fields)) => Ok(fields.into_iter().map(Into::into).collect()),
    }
}

fn parse_environment_line(fields: Vec<String>) -> std::result::Result<EnvironmentLine, HeaderError> {
    match fields.first() {
        Some(tag) if tag == TOA5_TAG => {}
        other => {
            return Err(HeaderError::NotToa5 {
                found: other.cloned(),
            });
        }
    }
    let fields: [String; ENV_LINE_LEN] = fields
        .try_into()
        .map_err(|fields: Vec<String>| HeaderError::EnvironmentLineLength {
            found: fields.len(),
        })?;
    let [_tag, env @ ..] = fields;
    Ok(EnvironmentLine::from(env))
}

/// First value in `names` that occurs more than once
pub(crate) fn first_duplicate(names: &[String]) -> Option<&String> {
    let mut seen = HashSet::with_capacity(names.len());
    names.iter().find(|name| !seen.insert(name.as_str()))
}

/// Read the four TOA5 header rows from `rows`.
///
/// Fails without reading further when the input ends early, a row cannot be
/// decoded, the first row is not a TOA5 environment line of eight fields,
/// the three column rows differ in length, or (unless
/// `allow_duplicate_names`) a column name repeats.
pub fn read_header<I, R, S, E>(
    mut rows: I,
    allow_duplicate_names: bool,
) -> std::result::Result<Header, HeaderError>
where
    I: Iterator<Item = std::result::Result<R, E>>,
    R: IntoIterator<Item = S>,
    S: Into<String>,
    E: Into<RowError>,
{
    let env_line = parse_environment_line(next_row(&mut rows, HeaderRow::EnvironmentLine)?)?;

    let names = next_row(&mut rows, HeaderRow::Names)?;
    let units = next_row(&mut rows, HeaderRow::Units)?;
    let processes = next_row(&mut rows, HeaderRow::Processes)?;

    if names.len() != units.len() || names.len() != processes.len() {
        return Err(HeaderError::ColumnCountMismatch {
            names: names.len(),
            units: units.len(),
            processes: processes.len(),
        });
    }

    if !allow_duplicate_names {
        if let Some(name) = first_duplicate(&names) {
            return Err(HeaderError::DuplicateColumnName { name: name.clone() });
        }
    }

    let columns: Vec<ColumnHeader> = names
        .into_iter()
        .zip(units)
        .zip(processes)
        .map(|((name, unit), prc)| ColumnHeader { name, unit, prc })
        .collect();

    debug!(
        "Parsed TOA5 header for table {:?} from station {:?}: {} columns",
        env_line.table_name,
        env_line.station_name,
        columns.len()
    );

    Ok(Header { env_line, columns })
}

/// CSV reader settings for TOA5 input: no header handling by the reader
/// itself, and rows of different lengths (8 fields on the environment line).
pub fn csv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

/// CSV writer settings for TOA5 output
pub fn csv_writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

/// Lines of a TOA5 file, each split into CSV fields.
///
/// `csv::Reader` drops blank lines, which would let a data row slide into
/// the header. Here a blank line is an empty row. Header rows never span
/// lines, so each line is split on its own.
struct CsvLines<'a, R> {
    input: &'a mut R,
    first: bool,
    buf: Vec<u8>,
}

impl<'a, R: io::BufRead> CsvLines<'a, R> {
    fn new(input: &'a mut R) -> Self {
        Self {
            input,
            first: true,
            buf: Vec::new(),
        }
    }
}

impl<R: io::BufRead> Iterator for CsvLines<'_, R> {
    type Item = std::result::Result<Vec<String>, csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.input.read_until(b'\n', &mut self.buf) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(e) => return Some(Err(e.into())),
        }

        let mut line = self.buf.as_slice();
        if std::mem::take(&mut self.first) {
            line = line.strip_prefix(UTF8_BOM).unwrap_or(line);
        }
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            return Some(Ok(Vec::new()));
        }

        let row = match csv_reader_builder().from_reader(line).records().next() {
            Some(record) => record.map(|r| r.iter().map(str::to_owned).collect()),
            None => Ok(Vec::new()),
        };
        Some(row)
    }
}

/// Read the header from the start of a TOA5 file.
///
/// Exactly four lines are consumed, so `input` is left on the first data
/// row and can be handed to a reader built with [`csv_reader_builder`].
pub fn read_csv_header<R: io::BufRead>(
    input: &mut R,
    allow_duplicate_names: bool,
) -> std::result::Result<Header, HeaderError> {
    read_header(CsvLines::new(input), allow_duplicate_names)
}

/// The four header rows for `env_line` and `columns`.
///
/// Row 1 is `TOA5` followed by the environment fields; rows 2 to 4 hold the
/// names, units and data processes. Values are written as they are, without
/// validation.
pub fn write_header<'a>(
    env_line: &'a EnvironmentLine,
    columns: &'a [ColumnHeader],
) -> impl Iterator<Item = Vec<&'a str>> + 'a {
    HeaderRow::ALL.into_iter().map(move |row| match row {
        HeaderRow::EnvironmentLine => std::iter::once(TOA5_TAG).chain(env_line.fields()).collect(),
        HeaderRow::Names => columns.iter().map(|c| c.name.as_str()).collect(),
        HeaderRow::Units => columns.iter().map(|c| c.unit.as_str()).collect(),
        HeaderRow::Processes => columns.iter().map(|c| c.prc.as_str()).collect(),
    })
}

/// Write the header rows to a CSV writer built with [`csv_writer_builder`]
pub fn write_csv_header<W: io::Write>(
    writer: &mut csv::Writer<W>,
    env_line: &EnvironmentLine,
    columns: &[ColumnHeader],
) -> Result<()> {
    for row in write_header(env_line, columns) {
        writer.write_record(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    fn env_row() -> Vec<String> {
        row(&[
            "TOA5",
            "Stn",
            "CR1000X",
            "12342",
            "CR1000X.Std.03.02",
            "CPU:Stn.CR1X",
            "2438",
            "Example",
        ])
    }

    fn example_rows() -> Vec<Vec<String>> {
        vec![
            env_row(),
            row(&["TIMESTAMP", "RECORD", "BattV_Min"]),
            row(&["TS", "RN", "Volts"]),
            row(&["", "", "Min"]),
            row(&["2021-06-19 00:00:00", "0", "12.99"]),
        ]
    }

    fn parse(rows: Vec<Vec<String>>, allow: bool) -> std::result::Result<Header, HeaderError> {
        read_header(rows.into_iter().map(Ok::<_, Infallible>), allow)
    }

    #[test]
    fn test_read_header_example() {
        let header = parse(example_rows(), false).unwrap();
        assert_eq!(header.env_line.station_name, "Stn");
        assert_eq!(header.env_line.logger_model, "CR1000X");
        assert_eq!(header.env_line.logger_serial, "12342");
        assert_eq!(header.env_line.logger_os, "CR1000X.Std.03.02");
        assert_eq!(header.env_line.program_name, "CPU:Stn.CR1X");
        assert_eq!(header.env_line.program_sig, "2438");
        assert_eq!(header.env_line.table_name, "Example");
        assert_eq!(
            header.columns,
            vec![
                ColumnHeader::new("TIMESTAMP", "TS", ""),
                ColumnHeader::new("RECORD", "RN", ""),
                ColumnHeader::new("BattV_Min", "Volts", "Min"),
            ]
        );
    }

    #[test]
    fn test_read_header_leaves_data_rows() {
        let mut rows = example_rows().into_iter().map(Ok::<_, Infallible>);
        read_header(&mut rows, false).unwrap();
        let next = rows.next().unwrap().unwrap();
        assert_eq!(next, row(&["2021-06-19 00:00:00", "0", "12.99"]));
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_too_few_rows() {
        for (len, expected) in [
            (0, HeaderRow::EnvironmentLine),
            (1, HeaderRow::Names),
            (2, HeaderRow::Units),
            (3, HeaderRow::Processes),
        ] {
            let rows: Vec<_> = example_rows().into_iter().take(len).collect();
            match parse(rows, false) {
                Err(HeaderError::UnexpectedEnd { row }) => assert_eq!(row, expected),
                other => panic!("expected UnexpectedEnd for {len} rows, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_not_toa5() {
        let mut rows = example_rows();
        rows[0][0] = "TOB1".to_string();
        assert!(matches!(
            parse(rows, false),
            Err(HeaderError::NotToa5 { found: Some(tag) }) if tag == "TOB1"
        ));

        let mut rows = example_rows();
        rows[0] = Vec::new();
        assert!(matches!(
            parse(rows, false),
            Err(HeaderError::NotToa5 { found: None })
        ));
    }

    #[test]
    fn test_environment_line_length() {
        let mut rows = example_rows();
        rows[0].push("extra".to_string());
        assert!(matches!(
            parse(rows, false),
            Err(HeaderError::EnvironmentLineLength { found: 9 })
        ));

        let mut rows = example_rows();
        rows[0].truncate(7);
        assert!(matches!(
            parse(rows, false),
            Err(HeaderError::EnvironmentLineLength { found: 7 })
        ));
    }

    #[test]
    fn test_column_count_mismatch() {
        let mut rows = example_rows();
        rows[2].pop();
        let err = parse(rows, false).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::ColumnCountMismatch {
                names: 3,
                units: 2,
                processes: 3
            }
        ));

        let mut rows = example_rows();
        rows[3].push(String::new());
        assert!(matches!(
            parse(rows, false),
            Err(HeaderError::ColumnCountMismatch { processes: 4, .. })
        ));
    }

    #[test]
    fn test_duplicate_names() {
        let mut rows = example_rows();
        rows[1][2] = "RECORD".to_string();
        let err = parse(rows.clone(), false).unwrap_err();
        assert!(err.to_string().contains("\"RECORD\""));
        assert!(matches!(
            err,
            HeaderError::DuplicateColumnName { ref name } if name == "RECORD"
        ));

        let header = parse(rows, true).unwrap();
        assert_eq!(header.columns[1].name, "RECORD");
        assert_eq!(header.columns[2].name, "RECORD");
        assert_eq!(header.columns[2].unit, "Volts");
    }

    #[test]
    fn test_row_decode_error() {
        let rows: Vec<std::result::Result<Vec<String>, io::Error>> = vec![
            Ok(env_row()),
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad bytes")),
        ];
        let err = read_header(rows.into_iter(), false).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::RowDecode {
                row: HeaderRow::Names,
                ..
            }
        ));
        assert!(err.to_string().contains("bad bytes"));
    }

    #[test]
    fn test_write_header() {
        let header = parse(example_rows(), false).unwrap();
        let rows: Vec<Vec<&str>> = write_header(&header.env_line, &header.columns).collect();
        assert_eq!(rows.len(), 4);
        let expected: Vec<Vec<String>> = example_rows().into_iter().take(4).collect();
        for (written, expected) in rows.iter().zip(&expected) {
            assert_eq!(written, expected);
        }
    }

    #[test]
    fn test_round_trip() {
        let env = EnvironmentLine::from([
            "a".to_string(),
            "b, with comma".to_string(),
            String::new(),
            "d".to_string(),
            "e\"quoted\"".to_string(),
            "f".to_string(),
            "g".to_string(),
        ]);
        let columns = vec![
            ColumnHeader::named("x"),
            ColumnHeader::new("y", "Deg C", "Avg"),
            ColumnHeader::new("z(1,2)", "", "Smp"),
        ];
        let rows = write_header(&env, &columns).map(Ok::<_, Infallible>);
        let header = read_header(rows, false).unwrap();
        assert_eq!(header.into_parts(), (env, columns));
    }

    #[test]
    fn test_round_trip_through_csv() {
        let env = EnvironmentLine::from([
            "Stn".to_string(),
            "CR6".to_string(),
            "1".to_string(),
            "CR6.Std.12".to_string(),
            "CPU:a,b.CR6".to_string(),
            "77".to_string(),
            "Daily".to_string(),
        ]);
        let columns = vec![
            ColumnHeader::new("TIMESTAMP", "TS", ""),
            ColumnHeader::new("AirT", "Deg C", "Max"),
        ];

        let mut writer = csv_writer_builder().from_writer(Vec::new());
        write_csv_header(&mut writer, &env, &columns).unwrap();
        writer.write_record(["2024-01-01 00:00:00", "3.5"]).unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut input = bytes.as_slice();
        let header = read_csv_header(&mut input, false).unwrap();
        assert_eq!(header.env_line, env);
        assert_eq!(header.columns, columns);

        let mut reader = csv_reader_builder().from_reader(input);
        let data: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(data.len(), 1);
        assert_eq!(&data[0][1], "3.5");
    }

    #[test]
    fn test_csv_header_blank_lines_are_rows() {
        // blank data process row of a single column file
        let mut input = "TOA5,a,b,c,d,e,f,g\nx\nV\n\n1\n".as_bytes();
        assert!(matches!(
            read_csv_header(&mut input, false),
            Err(HeaderError::ColumnCountMismatch {
                names: 1,
                units: 1,
                processes: 0
            })
        ));

        let mut input = "\nTOA5,a,b,c,d,e,f,g\nx\nV\n,\n".as_bytes();
        assert!(matches!(
            read_csv_header(&mut input, false),
            Err(HeaderError::NotToa5 { found: None })
        ));

        let mut input = "TOA5,a,b,c,d,e,f,g\r\nx\r\n\r\n".as_bytes();
        assert!(matches!(
            read_csv_header(&mut input, false),
            Err(HeaderError::UnexpectedEnd {
                row: HeaderRow::Processes
            })
        ));
    }

    #[test]
    fn test_csv_header_consumes_four_lines() {
        let text = "\u{feff}\"TOA5\",\"Stn\",\"CR6\",\"1\",\"os\",\"p\",\"9\",\"t\"\r\n\
                    \"TIMESTAMP\",\"Note\"\r\n\
                    \"TS\",\"\"\r\n\
                    \"\",\"Smp\"\r\n\
                    \"2024-01-01 00:00:00\",\"a, b\"\r\n";
        let mut input = text.as_bytes();
        let header = read_csv_header(&mut input, false).unwrap();
        assert_eq!(header.env_line.station_name, "Stn");
        assert_eq!(header.columns[1], ColumnHeader::new("Note", "", "Smp"));
        assert_eq!(input, "\"2024-01-01 00:00:00\",\"a, b\"\r\n".as_bytes());
    }

    #[test]
    fn test_zero_columns() {
        let rows = vec![env_row(), Vec::new(), Vec::new(), Vec::new()];
        let header = parse(rows, false).unwrap();
        assert_eq!(header.column_count(), 0);
    }
}
