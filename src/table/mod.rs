//! Result table: typed rows aggregated from scraped records.

use crate::bidfta::Record;
use crate::config::RowPolicy;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::num::ParseFloatError;
use thiserror::Error;
use tracing::{debug, warn};

/// Column coercion failures raised while building a [`ResultTable`].
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("row {row}: cannot parse end timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: time remaining '{value}' is not a number of seconds")]
    InvalidTimeRemaining { row: usize, value: String },
}

/// Column names in table order.
pub const COLUMNS: [&str; 12] = [
    "title",
    "current_bid",
    "image_url",
    "end_datetime",
    "time_remaining",
    "msrp",
    "condition",
    "lot_code",
    "search_term",
    "bids_count",
    "auction_id",
    "hours_remaining",
];

/// One normalized listing row.
///
/// Field order matches [`COLUMNS`] and drives the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub title: String,
    /// Display string, e.g. `$1,234.50`
    pub current_bid: String,
    pub image_url: String,
    /// `None` when the site sent no timestamp
    pub end_datetime: Option<DateTime<Utc>>,
    pub time_remaining: String,
    /// Display string, e.g. `$1,234.50`
    pub msrp: String,
    pub condition: String,
    pub lot_code: String,
    pub search_term: String,
    pub bids_count: u64,
    pub auction_id: String,
    /// `None` when the site sent no remaining time
    pub hours_remaining: Option<f64>,
}

impl Row {
    /// Coerces a raw record into typed columns. `index` is only used in errors.
    pub fn from_record(record: Record, index: usize) -> Result<Self, NormalizeError> {
        let end_datetime = parse_end_datetime(&record.end_datetime).map_err(|_| {
            NormalizeError::InvalidTimestamp { row: index, value: record.end_datetime.clone() }
        })?;

        let hours_remaining =
            parse_hours_remaining(&record.time_remaining).map_err(|_| {
                NormalizeError::InvalidTimeRemaining {
                    row: index,
                    value: record.time_remaining.clone(),
                }
            })?;

        Ok(Self {
            title: record.title,
            current_bid: format_currency(record.current_bid),
            image_url: record.image_url,
            end_datetime,
            time_remaining: record.time_remaining,
            msrp: format_currency(record.msrp),
            condition: record.condition,
            lot_code: record.lot_code,
            search_term: record.search_term,
            bids_count: record.bids_count,
            auction_id: record.auction_id,
            hours_remaining,
        })
    }
}

/// All rows produced by one scrape invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<Row>,
}

impl ResultTable {
    /// Builds the table from flattened records, applying `policy` to rows that fail coercion.
    pub fn from_records(records: Vec<Record>, policy: RowPolicy) -> Result<Self, NormalizeError> {
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            match Row::from_record(record, index) {
                Ok(row) => rows.push(row),
                Err(e) if policy == RowPolicy::Skip => warn!("Skipping invalid row: {}", e),
                Err(e) => return Err(e),
            }
        }

        debug!("Aggregated {} rows", rows.len());
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Formats an amount as dollars with thousands separators and two decimals.
///
/// Negative amounts keep the sign after the symbol: `$-5.00`.
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let nonzero = fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if amount < 0.0 && nonzero { "-" } else { "" };
    format!("${}{}.{}", sign, grouped, cents)
}

/// Parses an upstream end timestamp. Empty text means no timestamp.
///
/// Accepts RFC 3339, date-times with a `T` or space separator and an optional
/// offset (`+00:00` or `+0000`), and bare `YYYY-MM-DD` dates. Values without
/// an offset are read as UTC; bare dates as midnight UTC.
pub fn parse_end_datetime(raw: &str) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let with_offset = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%z"));
    if let Ok(dt) = with_offset {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(|naive| Some(naive.and_utc()))
}

/// Converts a text seconds count to hours. Empty text means unknown.
pub fn parse_hours_remaining(raw: &str) -> Result<Option<f64>, ParseFloatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>().map(|seconds| Some(seconds / 3600.0))
}
