//! bidfta-scraper - Concurrent BidFTA auction listing scraper
//!
//! Fetches the first results page for each search term, extracts the
//! listings embedded in the page's Next.js payload, and aggregates them
//! into a typed result table for console display or CSV export.

pub mod bidfta;
pub mod commands;
pub mod config;
pub mod format;
pub mod table;

pub use bidfta::{build_url, BidftaClient, ListingSearch, Parser, Record};
pub use commands::ScrapeCommand;
pub use config::{Config, FetchMode, RowPolicy};
pub use format::format_results;
pub use table::{NormalizeError, ResultTable, Row};
