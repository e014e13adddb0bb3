//! HTTP client for BidFTA requests using wreq for TLS fingerprint emulation.

use crate::bidfta::url::{build_url_with_base, BASE_URL};
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;
use wreq_util::Emulation;

/// Browser identification sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Trait for fetching search result pages - enables mocking for tests.
#[async_trait]
pub trait ListingSearch: Send + Sync {
    /// Fetches the first results page for `term` and returns the HTML body.
    async fn search(&self, term: &str) -> Result<String>;
}

/// BidFTA HTTP client.
pub struct BidftaClient {
    client: Client,
    location_id: String,
    base_url: Option<String>,
}

impl BidftaClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a new client with an optional custom base URL (for testing).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, location_id: config.location_id.clone(), base_url })
    }

    /// Returns the base URL (custom for testing, or the production site).
    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(BASE_URL)
    }

    /// Builds the search URL for `term` at the configured location.
    pub fn search_url(&self, term: &str) -> String {
        build_url_with_base(self.base_url(), term, &self.location_id)
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl ListingSearch for BidftaClient {
    async fn search(&self, term: &str) -> Result<String> {
        let url = self.search_url(term);

        info!("Searching: {}", term);
        self.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn make_test_config() -> Config {
        Config { request_delay_ms: Some(0), ..Config::default() }
    }

    #[tokio::test]
    async fn test_search_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("pageId", "1"))
            .and(query_param("itemSearchKeywords", "aquarium"))
            .and(query_param("locations", "616"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>tanks</html>"))
            .mount(&mock_server)
            .await;

        let client =
            BidftaClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let body = client.search("aquarium").await.unwrap();
        assert!(body.contains("tanks"));
    }

    #[tokio::test]
    async fn test_search_sends_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items"))
            .and(|req: &Request| {
                req.headers.get("user-agent").is_some_and(|v| v.as_bytes() == USER_AGENT.as_bytes())
            })
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            BidftaClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        assert_eq!(client.search("filter").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_search_decodes_encoded_term() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("itemSearchKeywords", "fish tank"))
            .respond_with(ResponseTemplate::new(200).set_body_string("matched"))
            .mount(&mock_server)
            .await;

        let client =
            BidftaClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        assert_eq!(client.search("fish tank").await.unwrap(), "matched");
    }

    #[tokio::test]
    async fn test_http_error_404() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client =
            BidftaClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let err = client.search("missing").await.unwrap_err().to_string();
        assert!(err.contains("404"));
    }

    #[tokio::test]
    async fn test_http_error_500() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client =
            BidftaClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();

        let err = client.search("test").await.unwrap_err().to_string();
        assert!(err.contains("500"));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Nothing listens on port 9 locally.
        let client =
            BidftaClient::with_base_url(&make_test_config(), Some("http://127.0.0.1:9".to_string()))
                .unwrap();

        let err = client.search("test").await.unwrap_err().to_string();
        assert!(err.contains("Failed to send request"));
    }

    #[tokio::test]
    async fn test_search_url_default_base() {
        let client = BidftaClient::new(&make_test_config()).unwrap();
        assert_eq!(
            client.search_url("aquarium"),
            "https://www.bidfta.com/items?pageId=1&itemSearchKeywords=aquarium&locations=616"
        );
    }

    #[tokio::test]
    async fn test_search_url_custom_location() {
        let config = Config { location_id: "99".to_string(), ..make_test_config() };
        let client =
            BidftaClient::with_base_url(&config, Some("http://custom.url".to_string())).unwrap();
        assert_eq!(
            client.search_url("motor"),
            "http://custom.url/items?pageId=1&itemSearchKeywords=motor&locations=99"
        );
    }
}
