//! CSV and JSON export of simulation results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::GlobalResult;

/// Column header for the day-summary CSV.
const HEADER: &str = "day,max_power_kw,energy_kwh";

/// Exports day summaries to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_days_csv(result: &GlobalResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_days_csv(result, buf)
}

/// Writes one row per day summary to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_days_csv(result: &GlobalResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;
    for (day, summary) in result.days.iter().enumerate() {
        wtr.write_record(&[
            day.to_string(),
            format!("{:.4}", summary.max_power_kw),
            format!("{:.4}", summary.energy_consumed_kwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the full result as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn export_json(result: &GlobalResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut buf = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut buf, result).map_err(io::Error::other)?;
    buf.flush()
}
