//! Command implementations for the `toa5` CLI
//!
//! This module contains the command execution logic and logging setup.

use crate::cli::args::{Args, Commands, HeaderArgs, OutputFormat, ToCsvArgs};
use crate::config::ReadConfig;
use crate::header::{csv_reader_builder, first_duplicate, read_csv_header};
use crate::models::Header;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use tracing::{debug, info};

/// Main command runner
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    debug!("Command line arguments: {:?}", args);

    match &args.command {
        Commands::ToCsv(to_csv) => run_to_csv(to_csv),
        Commands::Header(header) => run_header(header),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("toa5={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

fn run_to_csv(args: &ToCsvArgs) -> Result<()> {
    let input = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let config = args.read_config();

    let rows = match &args.output {
        Some(path) => {
            let output = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            convert_to_csv(BufReader::new(input), BufWriter::new(output), &config)
        }
        None => convert_to_csv(BufReader::new(input), io::stdout().lock(), &config),
    }
    .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    info!("Wrote {} data rows from {}", rows, args.input.display());
    Ok(())
}

/// Copy a TOA5 file to `output` as CSV with one header row of transformed
/// column names. Returns the number of data rows written.
pub fn convert_to_csv<R: Read, W: Write>(
    input: R,
    output: W,
    config: &ReadConfig,
) -> Result<usize> {
    let mut input = BufReader::new(input);
    let header = read_csv_header(&mut input, config.allow_duplicate_names)?;

    let names = header.column_names(&config.transform())?;
    if let Some(name) = first_duplicate(&names) {
        bail!("Transformed column name {:?} is not unique", name);
    }

    let mut reader = csv_reader_builder().from_reader(input);
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(output);
    writer.write_record(&names)?;

    let mut record = csv::StringRecord::new();
    let mut rows = 0;
    while reader.read_record(&mut record)? {
        writer.write_record(&record)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

fn run_header(args: &HeaderArgs) -> Result<()> {
    let input = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let header = read_csv_header(&mut BufReader::new(input), args.allow_dupes)
        .with_context(|| format!("Failed to read TOA5 header of {}", args.input.display()))?;

    let mut stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &header)?;
            writeln!(stdout)?;
        }
        OutputFormat::Text => print_header(&mut stdout, &header)?,
    }
    Ok(())
}

/// Human readable header summary
fn print_header<W: Write>(out: &mut W, header: &Header) -> Result<()> {
    let env = &header.env_line;
    writeln!(out, "{}", "Environment line".bright_green().bold())?;
    for (label, value) in [
        ("Station:", &env.station_name),
        ("Logger model:", &env.logger_model),
        ("Logger serial:", &env.logger_serial),
        ("Logger OS:", &env.logger_os),
        ("Program:", &env.program_name),
        ("Signature:", &env.program_sig),
        ("Table:", &env.table_name),
    ] {
        writeln!(out, "  {:<15} {}", label.bright_cyan(), value)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} ({})",
        "Columns".bright_green().bold(),
        header.column_count()
    )?;
    for (i, col) in header.columns.iter().enumerate() {
        writeln!(
            out,
            "  {:>4}. {:<24} {:<16} {}",
            (i + 1).to_string().bright_yellow(),
            col.name,
            col.unit,
            col.prc.bright_black()
        )?;
    }
    if let Some(hint) = header.index_hint() {
        writeln!(out)?;
        writeln!(out, "  {} {:?}", "Index:".bright_cyan(), hint)?;
    }
    Ok(())
}
