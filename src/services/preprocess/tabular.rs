//! Tabular OHLCV ingestion.
//!
//! Headers are matched case-insensitively after trimming, with common
//! abbreviations mapped onto canonical names. Price cells that are not
//! numbers become null and any row missing one of the four prices is dropped.

use std::io::Read;

use crate::error::AnalysisError;
use crate::types::{OhlcPoint, PriceSeries};

/// Columns every input must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["open", "high", "low", "close"];

/// Untyped table: a header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a CSV document whose first record is the header row.
    ///
    /// Ragged rows are accepted; missing trailing cells read as null.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, AnalysisError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = csv_reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { headers, rows })
    }
}

/// Canonical name for a raw header.
pub fn normalize_header(header: &str) -> String {
    let lowered = header.trim().to_lowercase();
    match lowered.as_str() {
        "timestamp" | "datetime" | "date" => "time".to_string(),
        "o" => "open".to_string(),
        "h" => "high".to_string(),
        "l" => "low".to_string(),
        "c" => "close".to_string(),
        "v" => "volume".to_string(),
        _ => lowered,
    }
}

/// Positions of the canonical columns within a row.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
    time: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self, AnalysisError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        // First matching column wins when several map to the same name
        let find = |name: &str| normalized.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|&name| find(name).is_none())
            .collect();

        match (find("open"), find("high"), find("low"), find("close")) {
            (Some(open), Some(high), Some(low), Some(close)) => Ok(Self {
                open,
                high,
                low,
                close,
                volume: find("volume"),
                time: find("time"),
            }),
            _ => Err(AnalysisError::Format(format!(
                "missing required column(s) {}. Required columns: Open, High, Low, Close",
                missing.join(", ")
            ))),
        }
    }
}

/// Parse a cell as a number; anything unparseable or `NaN` is null.
fn coerce_number(cell: Option<&String>) -> Option<f64> {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

/// Normalize, coerce and validate a table into a price series.
pub fn build_series(table: &RawTable) -> Result<PriceSeries, AnalysisError> {
    let columns = ColumnMap::resolve(&table.headers)?;

    let candles: Vec<OhlcPoint> = table
        .rows
        .iter()
        .filter_map(|row| {
            let open = coerce_number(row.get(columns.open))?;
            let high = coerce_number(row.get(columns.high))?;
            let low = coerce_number(row.get(columns.low))?;
            let close = coerce_number(row.get(columns.close))?;
            Some(OhlcPoint {
                time: columns
                    .time
                    .and_then(|i| row.get(i))
                    .filter(|t| !t.is_empty())
                    .cloned(),
                open,
                high,
                low,
                close,
                volume: columns.volume.and_then(|i| coerce_number(row.get(i))),
            })
        })
        .collect();

    let dropped = table.rows.len() - candles.len();
    if dropped > 0 {
        tracing::debug!("Dropped {} rows with missing or non-numeric prices", dropped);
    }

    PriceSeries::new(candles)
}
