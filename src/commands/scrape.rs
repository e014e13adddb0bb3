//! Scrape command: fetch every search term, aggregate, and format.

use crate::bidfta::{BidftaClient, ListingSearch, Parser, Record};
use crate::config::{Config, FetchMode};
use crate::format::format_results;
use crate::table::ResultTable;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Executes a multi-term listing scrape.
pub struct ScrapeCommand {
    config: Config,
    parser: Parser,
}

impl ScrapeCommand {
    /// Creates a new scrape command.
    pub fn new(config: Config) -> Self {
        Self { config, parser: Parser::new() }
    }

    /// Scrapes all terms and returns formatted output, saving CSV to `save_path` if given.
    pub async fn execute(&self, terms: &[String], save_path: Option<&Path>) -> Result<String> {
        let table = self.scrape_search_terms(terms).await?;
        format_results(&table, save_path)
    }

    /// Scrapes all terms against the live site.
    pub async fn scrape_search_terms(&self, terms: &[String]) -> Result<ResultTable> {
        let client = BidftaClient::new(&self.config).context("Failed to create HTTP client")?;

        self.scrape_search_terms_with_client(&client, terms).await
    }

    /// Scrapes all terms with a provided client (for testing).
    ///
    /// Fetch and extraction failures only cost the affected term its rows;
    /// aggregation failures abort unless rows may be skipped.
    pub async fn scrape_search_terms_with_client(
        &self,
        client: &impl ListingSearch,
        terms: &[String],
    ) -> Result<ResultTable> {
        info!("Scraping {} terms ({} mode)", terms.len(), self.config.mode);

        let per_term = match self.config.mode {
            FetchMode::Sequential => self.fetch_sequential(client, terms).await,
            FetchMode::Concurrent => self.fetch_concurrent(client, terms).await,
        };

        let records: Vec<Record> = per_term.into_iter().flatten().collect();
        info!("Collected {} items", records.len());

        let table = ResultTable::from_records(records, self.config.on_invalid_row)?;
        Ok(table)
    }

    /// One term at a time in input order, pausing between terms.
    async fn fetch_sequential(
        &self,
        client: &impl ListingSearch,
        terms: &[String],
    ) -> Vec<Vec<Record>> {
        let delay = self.config.request_delay();
        let mut results = Vec::with_capacity(terms.len());

        for (i, term) in terms.iter().enumerate() {
            info!("Scraping term: {}", term);
            let html = client.search(term).await;
            results.push(self.extract(html, term));

            if i + 1 < terms.len() {
                pause(delay).await;
            }
        }

        results
    }

    /// All terms at once; at most `max_concurrent_requests` requests hold a gate slot.
    ///
    /// A slot covers the request and the pacing delay after it, not parsing.
    /// Results keep input order regardless of completion order.
    async fn fetch_concurrent(
        &self,
        client: &impl ListingSearch,
        terms: &[String],
    ) -> Vec<Vec<Record>> {
        let delay = self.config.request_delay();
        let gate = Semaphore::new(self.config.concurrency_limit());
        debug!("Concurrency gate: {} slots", self.config.concurrency_limit());

        let tasks = terms.iter().map(|term| {
            let gate = &gate;
            async move {
                let html = match gate.acquire().await {
                    Ok(_permit) => {
                        let html = client.search(term).await;
                        pause(delay).await;
                        html
                    }
                    Err(e) => Err(e).context("Concurrency gate closed"),
                };
                self.extract(html, term)
            }
        });

        join_all(tasks).await
    }

    /// Turns a fetch outcome into records; fetch errors become an empty list.
    fn extract(&self, html: Result<String>, term: &str) -> Vec<Record> {
        match html {
            Ok(html) => {
                let records = self.parser.parse_search(&html, term);
                info!("Found {} items for search term: {}", records.len(), term);
                records
            }
            Err(e) => {
                error!("Request error for term '{}': {:#}", term, e);
                Vec::new()
            }
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        debug!("Delaying {}ms", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}
