//! Quote normalization: map an upstream [`Frame`] onto a fixed date/close schema.
//!
//! Upstream column naming is not stable across provider versions, so both
//! fields are resolved through an ordered fallback chain. The first candidate
//! present wins; an explicit final fallback means resolution always terminates
//! with an answer, even a possibly-wrong one.
//!
//! It does **not**:
//! - fetch data (see `source.rs`)
//! - validate that dates are chronological
//! - check that a fallback column actually holds prices

use serde::Serialize;
use tracing::{debug, warn};

use crate::frame::{Cell, Frame};

/// Date column candidates, highest priority first. Falls back to the row index.
pub const DATE_COLUMNS: &[&str] = &["time", "date"];

/// Close column candidates, highest priority first. Falls back to the last column.
pub const CLOSE_COLUMNS: &[&str] = &["close", "close_price", "closePrice"];

// ---------------------------------------------------------------------------
// Output type
// ---------------------------------------------------------------------------

/// One symbol's closing prices over a window, index-aligned with their dates.
///
/// Only [`normalize`] builds this type, so `dates.len() == closes.len()` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSeries {
    symbol: String,
    dates: Vec<String>,
    /// `None` where the selected cell is not numeric; serialized as `null`.
    closes: Vec<Option<f64>>,
}

impl QuoteSeries {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn closes(&self) -> &[Option<f64>] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Where the dates of a [`QuoteSeries`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource<'a> {
    Column(&'a str),
    Index,
}

/// Where the closes of a [`QuoteSeries`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseSource<'a> {
    Column(&'a str),
    /// Known-weak guess: the last column by position, whatever it holds.
    LastColumn(&'a str),
    /// The frame has no columns at all.
    Missing,
}

/// Pick the date source for `frame`.
pub fn resolve_date_source(frame: &Frame) -> DateSource<'_> {
    first_present(frame, DATE_COLUMNS)
        .map(DateSource::Column)
        .unwrap_or(DateSource::Index)
}

/// Pick the close source for `frame`.
pub fn resolve_close_source(frame: &Frame) -> CloseSource<'_> {
    if let Some(name) = first_present(frame, CLOSE_COLUMNS) {
        return CloseSource::Column(name);
    }
    match frame.last_column() {
        Some(col) => CloseSource::LastColumn(col.name.as_str()),
        None => CloseSource::Missing,
    }
}

fn first_present<'a>(frame: &'a Frame, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|name| frame.column(name))
        .map(|col| col.name.as_str())
}

fn cells<'a>(frame: &'a Frame, name: &str) -> &'a [Cell] {
    frame.column(name).map(|c| c.values.as_slice()).unwrap_or(&[])
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Project `frame` onto `(dates, closes)` for `symbol`.
///
/// Never fails: missing columns resolve through the fallback chains above.
/// An empty frame yields an empty series.
pub fn normalize(symbol: &str, frame: &Frame) -> QuoteSeries {
    let date_source = resolve_date_source(frame);
    let dates: Vec<String> = match date_source {
        DateSource::Column(name) => cells(frame, name).iter().map(Cell::to_text).collect(),
        DateSource::Index => frame.index().iter().map(Cell::to_text).collect(),
    };

    let close_source = resolve_close_source(frame);
    let closes: Vec<Option<f64>> = match close_source {
        CloseSource::Column(name) => cells(frame, name).iter().map(Cell::as_f64).collect(),
        CloseSource::LastColumn(name) => {
            if !frame.is_empty() {
                warn!(
                    symbol,
                    column = name,
                    "no close column found; using last column as close"
                );
            }
            // Positional: an earlier column may share the last column's name.
            frame
                .last_column()
                .map(|col| col.values.iter().map(Cell::as_f64).collect())
                .unwrap_or_default()
        }
        CloseSource::Missing => vec![None; frame.len()],
    };

    debug!(
        symbol,
        rows = dates.len(),
        ?date_source,
        ?close_source,
        "normalized quote frame"
    );

    QuoteSeries {
        symbol: symbol.to_string(),
        dates,
        closes,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
