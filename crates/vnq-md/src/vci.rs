//! VCI (Vietcap) historical quote source.
//!
//! Talks to the trading API's OHLC gap-chart endpoint, which answers with
//! parallel arrays per symbol. The response is reshaped into a [`Frame`] with
//! columns `time, open, high, low, close, volume`.

use std::time::Duration;

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use chrono_tz::Asia::Ho_Chi_Minh;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::frame::{Cell, Column, Frame};
use crate::source::{HistoryRequest, QuoteSource, SourceError};
use crate::Interval;

pub const DEFAULT_BASE_URL: &str = "https://trading.vietcap.com.vn/api";

/// Column names of every frame this source returns.
pub const COLUMNS: &[&str] = &["time", "open", "high", "low", "close", "volume"];

/// Gap-chart prices are in VND; quotes are reported in thousands of VND.
const PRICE_UNIT: f64 = 1000.0;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// VCI-backed quote source.
#[derive(Debug, Clone)]
pub struct VciSource {
    http: reqwest::Client,
    base_url: String,
}

impl Default for VciSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VciSource {
    pub fn new() -> Self {
        Self::new_with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn new_with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn build_gap_chart_url(&self) -> String {
        format!(
            "{}/chart/OHLCChart/gap-chart",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl QuoteSource for VciSource {
    fn source_name(&self) -> &'static str {
        "VCI"
    }

    async fn history(&self, req: &HistoryRequest) -> Result<Frame, SourceError> {
        let (start, end) = req.window()?;
        if start > end {
            debug!(symbol = %req.symbol, %start, %end, "empty window; skipping fetch");
            return Ok(Frame::empty(COLUMNS));
        }

        let body = GapChartRequest {
            time_frame: req.interval.as_vci_time_frame(),
            symbols: vec![req.symbol.trim().to_ascii_uppercase()],
            to: day_start_ts(end.checked_add_days(Days::new(1)).unwrap_or(end))?,
            count_back: count_back(start, end, req.interval),
        };

        let resp = self
            .http
            .post(self.build_gap_chart_url())
            .timeout(REQUEST_TIMEOUT)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::REFERER, "https://trading.vietcap.com.vn/")
            .header(reqwest::header::ORIGIN, "https://trading.vietcap.com.vn")
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: text.trim().to_string(),
            });
        }

        let payload: Vec<GapChartSeries> = serde_json::from_str(&text)
            .map_err(|e| SourceError::Decode(format!("vci gap-chart json: {e}")))?;

        let frame = match payload.into_iter().next() {
            Some(series) => series.into_frame(req.interval, start, end)?,
            None => Frame::empty(COLUMNS),
        };

        info!(
            symbol = %req.symbol,
            interval = %req.interval,
            start = %req.start,
            end = %req.end,
            rows = frame.len(),
            "vci history fetched"
        );

        Ok(frame)
    }
}

/// Epoch seconds of local midnight in Vietnam.
fn day_start_ts(day: NaiveDate) -> Result<i64, SourceError> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|midnight| Ho_Chi_Minh.from_local_datetime(&midnight).earliest())
        .map(|dt| dt.timestamp())
        .ok_or_else(|| SourceError::Request(format!("no local midnight for {day}")))
}

/// Upper bound on bars needed to cover `[start, end]`.
fn count_back(start: NaiveDate, end: NaiveDate, interval: Interval) -> i64 {
    ((end - start).num_days() + 1) * interval.max_bars_per_day()
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GapChartRequest {
    time_frame: &'static str,
    symbols: Vec<String>,
    to: i64,
    count_back: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct GapChartSeries {
    #[serde(default)]
    o: Vec<Option<f64>>,
    #[serde(default)]
    h: Vec<Option<f64>>,
    #[serde(default)]
    l: Vec<Option<f64>>,
    #[serde(default)]
    c: Vec<Option<f64>>,
    #[serde(default)]
    v: Vec<Option<f64>>,
    #[serde(default)]
    t: Vec<EpochField>,
}

/// VCI sends timestamps as numbers or as numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EpochField {
    Num(i64),
    Text(String),
}

impl EpochField {
    fn seconds(&self) -> Result<i64, SourceError> {
        match self {
            EpochField::Num(v) => Ok(*v),
            EpochField::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| SourceError::Decode(format!("vci timestamp '{s}' is not an integer"))),
        }
    }
}

impl GapChartSeries {
    fn into_frame(self, interval: Interval, start: NaiveDate, end: NaiveDate) -> Result<Frame, SourceError> {
        let n = self.t.len();
        for (name, len) in [
            ("o", self.o.len()),
            ("h", self.h.len()),
            ("l", self.l.len()),
            ("c", self.c.len()),
            ("v", self.v.len()),
        ] {
            if len != n {
                return Err(SourceError::Decode(format!(
                    "vci array '{name}' has {len} values, expected {n}"
                )));
            }
        }

        let mut times = Vec::with_capacity(n);
        let mut days = Vec::with_capacity(n);
        for t in self.t.iter() {
            let secs = t.seconds()?;
            let local = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| SourceError::Decode(format!("vci timestamp {secs} out of range")))?
                .with_timezone(&Ho_Chi_Minh)
                .naive_local();
            days.push(local.date());
            times.push(match interval {
                Interval::D1 => Cell::Date(local.date()),
                Interval::H1 | Interval::M1 => Cell::DateTime(local),
            });
        }

        let price = |v: Vec<Option<f64>>| -> Vec<Cell> {
            v.into_iter().map(|p| Cell::from(p.map(|x| x / PRICE_UNIT))).collect()
        };
        let volume: Vec<Cell> = self
            .v
            .into_iter()
            .map(|x| Cell::from(x.map(|x| x as i64)))
            .collect();

        let mut frame = Frame::new(vec![
            Column::new("time", times),
            Column::new("open", price(self.o)),
            Column::new("high", price(self.h)),
            Column::new("low", price(self.l)),
            Column::new("close", price(self.c)),
            Column::new("volume", volume),
        ])
        .map_err(|e| SourceError::Decode(e.to_string()))?;

        frame.retain_rows(|i| days[i] >= start && days[i] <= end);
        Ok(frame)
    }
}

// -----------------
// Tests (no network)
// -----------------
