//! vnq-md
//!
//! Market-data side of the quote facade.
//!
//! This crate owns the tabular result type, the quote normalizer and the
//! upstream source abstraction with its one concrete provider (VCI).
//! It does **not** serve HTTP; `vnq-daemon` and `vnq-cli` call into it.

pub mod frame;
pub mod quote;
pub mod source;
pub mod vci;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use frame::{Cell, Column, Frame, FrameError};
pub use quote::{normalize, QuoteSeries};
pub use source::{lookback_start, source_by_name, HistoryRequest, Quote, QuoteSource, SourceError};
pub use vci::VciSource;

/// Bar interval for historical requests.
///
/// Canonical user-facing values:
/// - `1m`
/// - `1H`
/// - `1D`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    M1,
    H1,
    D1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::H1 => "1H",
            Interval::D1 => "1D",
        }
    }

    /// VCI `timeFrame` value.
    pub fn as_vci_time_frame(&self) -> &'static str {
        match self {
            Interval::M1 => "ONE_MINUTE",
            Interval::H1 => "ONE_HOUR",
            Interval::D1 => "ONE_DAY",
        }
    }

    /// Upper bound on bars per calendar day, used to size `countBack`.
    pub fn max_bars_per_day(&self) -> i64 {
        match self {
            Interval::M1 => 300,
            Interval::H1 => 7,
            Interval::D1 => 1,
        }
    }

    pub fn parse(s: &str) -> Result<Self, SourceError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" | "1min" | "1minute" => Ok(Interval::M1),
            "1h" | "1hour" => Ok(Interval::H1),
            "1d" | "1day" => Ok(Interval::D1),
            other => Err(SourceError::Request(format!(
                "invalid interval '{other}'. expected one of: 1m | 1H | 1D"
            ))),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Interval {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}

// -----------------
// Tests (no network)
// -----------------
