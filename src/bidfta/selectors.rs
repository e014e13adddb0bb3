//! CSS selectors for BidFTA page parsing.
//!
//! The listing data lives in the Next.js hydration payload rather than in
//! rendered markup. Update this file if the site moves that payload.

use scraper::Selector;
use std::sync::LazyLock;

/// Element id of the embedded Next.js data script.
pub const NEXT_DATA_ID: &str = "__NEXT_DATA__";

/// Script element carrying the page's hydration JSON.
pub static NEXT_DATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());

/// Key path from the payload root to the listing array.
pub const ITEMS_PATH: [&str; 4] = ["props", "pageProps", "initialData", "items"];
