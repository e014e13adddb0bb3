//! Search URL construction for the BidFTA item listing page.

/// Production site root.
pub const BASE_URL: &str = "https://www.bidfta.com";

/// Path of the item search page.
pub const SEARCH_PATH: &str = "/items";

/// Location used when none is configured.
pub const DEFAULT_LOCATION_ID: &str = "616";

/// Builds the first-page search URL for `term` at `location_id` on the production site.
pub fn build_url(term: &str, location_id: &str) -> String {
    build_url_with_base(BASE_URL, term, location_id)
}

/// Builds the search URL against an arbitrary site root.
///
/// Parameter order is fixed: `pageId`, `itemSearchKeywords`, `locations`.
/// The term is percent-encoded; the location is inserted as given.
pub fn build_url_with_base(base_url: &str, term: &str, location_id: &str) -> String {
    format!(
        "{}{}?pageId=1&itemSearchKeywords={}&locations={}",
        base_url.trim_end_matches('/'),
        SEARCH_PATH,
        urlencoding::encode(term),
        location_id
    )
}
