//! Bar loading from CSV files.
//!
//! Expected header: `datetime,open,high,low,close,volume` (`date` is accepted
//! for the first column). Only datetime, high, low and close are required:
//! `volume` may be omitted or empty, and a missing `open` is taken from the
//! previous close (the first bar's own close), bounded by the bar's range.
//! Datetimes are
//! `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare `YYYY-MM-DD`
//! (midnight).
//!
//! Rows are returned in file order; ordering and sanity checks are left to
//! the classifier.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use trendsignal_core::Bar;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: invalid datetime {value:?}")]
    InvalidDatetime { row: usize, value: String },

    #[error("no bars found")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "date", alias = "timestamp")]
    datetime: String,
    #[serde(default)]
    open: Option<f64>,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Read bars from any CSV source with a header row.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, result) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        // Header is line 1.
        let line = i + 2;
        let timestamp = parse_datetime(&row.datetime).ok_or_else(|| LoadError::InvalidDatetime {
            row: line,
            value: row.datetime.clone(),
        })?;
        let open = match row.open {
            Some(open) => open,
            // Derived opens stay inside the bar's range across gaps.
            None => bars
                .last()
                .map_or(row.close, |b: &Bar| b.close)
                .max(row.low)
                .min(row.high),
        };
        bars.push(Bar {
            timestamp,
            open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.filter(|v| v.is_finite() && *v > 0.0).map_or(0, |v| v.round() as u64),
        });
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(bars)
}

/// Read bars from a CSV file.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_bars(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), bars = bars.len(), "bars loaded");
    Ok(bars)
}
