//! BidFTA-specific modules for URL building, HTTP client, parsing, and data models.

pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;
pub mod url;

pub use client::{BidftaClient, ListingSearch};
pub use models::Record;
pub use parser::Parser;
pub use url::build_url;
