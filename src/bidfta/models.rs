//! Data model for a single BidFTA auction listing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One auction listing as extracted from a search results page.
///
/// Every field has a defined empty value, so building a record from a
/// payload never fails on a missing or `null` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Listing title
    pub title: String,
    /// Current high bid
    pub current_bid: f64,
    /// Primary image URL
    pub image_url: String,
    /// Auction end timestamp, verbatim from the site
    pub end_datetime: String,
    /// Seconds left in the auction, as text
    pub time_remaining: String,
    /// Manufacturer's suggested retail price
    pub msrp: f64,
    /// Item condition label
    pub condition: String,
    /// Lot code
    pub lot_code: String,
    /// Number of bids placed
    pub bids_count: u64,
    /// Parent auction identifier
    pub auction_id: String,
    /// The query that produced this record
    pub search_term: String,
}

impl Record {
    /// Builds a record from a raw listing object, tagging it with `search_term`.
    pub fn from_json(item: &Value, search_term: &str) -> Self {
        Self {
            title: text_field(item, "title"),
            current_bid: number_field(item, "currentBid"),
            image_url: text_field(item, "imageUrl"),
            end_datetime: text_field(item, "utcEndDateTime"),
            time_remaining: text_field(item, "itemTimeRemaining"),
            msrp: number_field(item, "msrp"),
            condition: text_field(item, "condition"),
            lot_code: text_field(item, "lotCode"),
            bids_count: count_field(item, "bidsCount"),
            auction_id: text_field(item, "auctionId"),
            search_term: search_term.to_string(),
        }
    }
}

/// Text field: strings verbatim, numbers and booleans stringified, anything else empty.
fn text_field(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Numeric field: finite JSON numbers or numeric strings, otherwise 0.0.
fn number_field(item: &Value, key: &str) -> f64 {
    let value = match item.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|f| f.is_finite()).unwrap_or(0.0)
}

fn count_field(item: &Value, key: &str) -> u64 {
    match item.get(key) {
        Some(Value::Number(n)) => {
            n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)).unwrap_or(0)
        }
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
