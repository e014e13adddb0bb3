//! Extraction of listing records from BidFTA search pages.

use crate::bidfta::models::Record;
use crate::bidfta::selectors::{ITEMS_PATH, NEXT_DATA, NEXT_DATA_ID};
use scraper::Html;
use serde_json::Value;
use tracing::{debug, error, warn};

/// Parser for BidFTA search result pages.
///
/// Extraction never fails: a page without usable data yields no records
/// and the reason is logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a search results page into records tagged with `search_term`.
    pub fn parse_search(&self, html: &str, search_term: &str) -> Vec<Record> {
        let Some(payload) = self.next_data_text(html) else {
            warn!("No data found for search term: {}", search_term);
            return Vec::new();
        };

        let json: Value = match serde_json::from_str(&payload) {
            Ok(json) => json,
            Err(e) => {
                error!("JSON decode error for term '{}': {}", search_term, e);
                return Vec::new();
            }
        };

        self.extract_items(&json, search_term)
    }

    /// Converts the listing array of a decoded payload into records.
    pub fn extract_items(&self, json: &Value, search_term: &str) -> Vec<Record> {
        let items = match lookup_path(json, &ITEMS_PATH) {
            None => {
                debug!("Payload has no {} for '{}'", ITEMS_PATH.join("."), search_term);
                return Vec::new();
            }
            Some(Value::Array(items)) => items,
            Some(other) => {
                error!(
                    "Error extracting items for '{}': expected array, found {}",
                    search_term,
                    json_kind(other)
                );
                return Vec::new();
            }
        };

        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) => Some(Record::from_json(item, search_term)),
                other => {
                    error!(
                        "Error extracting items for '{}': expected object, found {}",
                        search_term,
                        json_kind(other)
                    );
                    None
                }
            })
            .collect()
    }

    /// Returns the text content of the `__NEXT_DATA__` script, if present.
    fn next_data_text(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let script = document.select(&NEXT_DATA).next()?;
        debug!("Found #{} script", NEXT_DATA_ID);
        Some(script.text().collect())
    }
}

/// Walks `path` through nested objects.
///
/// A missing key or a `null` at any segment ends the walk with `None`,
/// which callers treat as an empty listing array.
pub fn lookup_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(*key).filter(|v| !v.is_null()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
