//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::bidfta::url::DEFAULT_LOCATION_ID;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// BidFTA location filter
    #[serde(default = "default_location_id")]
    pub location_id: String,

    /// How search terms are scheduled
    #[serde(default)]
    pub mode: FetchMode,

    /// Pacing delay per request in milliseconds (mode default when unset)
    #[serde(default)]
    pub request_delay_ms: Option<u64>,

    /// Maximum in-flight requests in concurrent mode
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// What to do with rows whose columns fail type coercion
    #[serde(default)]
    pub on_invalid_row: RowPolicy,
}

fn default_location_id() -> String {
    DEFAULT_LOCATION_ID.to_string()
}

fn default_max_concurrent_requests() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location_id: default_location_id(),
            mode: FetchMode::default(),
            request_delay_ms: None,
            max_concurrent_requests: default_max_concurrent_requests(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
            on_invalid_row: RowPolicy::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("bidfta-scraper").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(location) = std::env::var("BIDFTA_LOCATION") {
            if !location.trim().is_empty() {
                self.location_id = location.trim().to_string();
            }
        }

        if let Ok(delay) = std::env::var("BIDFTA_DELAY") {
            if let Ok(d) = delay.parse() {
                self.request_delay_ms = Some(d);
            }
        }

        if let Ok(max) = std::env::var("BIDFTA_MAX_CONCURRENT") {
            if let Ok(m) = max.parse() {
                self.max_concurrent_requests = m;
            }
        }

        if let Ok(proxy) = std::env::var("BIDFTA_PROXY") {
            self.proxy = Some(proxy);
        }

        self
    }

    /// Pacing delay applied per request.
    ///
    /// Falls back to 2s in sequential mode and 500ms in concurrent mode.
    pub fn request_delay(&self) -> Duration {
        let ms = self.request_delay_ms.unwrap_or(match self.mode {
            FetchMode::Sequential => 2000,
            FetchMode::Concurrent => 500,
        });
        Duration::from_millis(ms)
    }

    /// Concurrency gate capacity, never below one.
    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrent_requests.max(1)
    }
}

/// Scheduling strategy for a multi-term scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// One term at a time, in input order.
    Sequential,
    /// All terms at once behind a concurrency gate.
    #[default]
    Concurrent,
}

impl std::str::FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Ok(FetchMode::Sequential),
            "concurrent" | "async" => Ok(FetchMode::Concurrent),
            _ => Err(format!("Unknown mode: {}. Use: sequential, concurrent", s)),
        }
    }
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Sequential => write!(f, "sequential"),
            FetchMode::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Handling of rows that fail column coercion during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Abort the whole run with an error.
    #[default]
    Fail,
    /// Drop the offending row and log a warning.
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.location_id, "616");
        assert_eq!(config.mode, FetchMode::Concurrent);
        assert!(config.request_delay_ms.is_none());
        assert_eq!(config.max_concurrent_requests, 5);
        assert!(config.proxy.is_none());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.on_invalid_row, RowPolicy::Fail);
    }

    #[test]
    fn test_request_delay_mode_defaults() {
        let mut config = Config::new();
        assert_eq!(config.request_delay(), Duration::from_millis(500));

        config.mode = FetchMode::Sequential;
        assert_eq!(config.request_delay(), Duration::from_secs(2));

        config.request_delay_ms = Some(0);
        assert_eq!(config.request_delay(), Duration::ZERO);
    }

    #[test]
    fn test_concurrency_limit_clamped() {
        let config = Config { max_concurrent_requests: 0, ..Config::default() };
        assert_eq!(config.concurrency_limit(), 1);

        let config = Config { max_concurrent_requests: 8, ..Config::default() };
        assert_eq!(config.concurrency_limit(), 8);
    }

    #[test]
    fn test_fetch_mode_parsing() {
        assert_eq!("sequential".parse::<FetchMode>().unwrap(), FetchMode::Sequential);
        assert_eq!("SEQ".parse::<FetchMode>().unwrap(), FetchMode::Sequential);
        assert_eq!("concurrent".parse::<FetchMode>().unwrap(), FetchMode::Concurrent);
        assert_eq!("async".parse::<FetchMode>().unwrap(), FetchMode::Concurrent);

        let err = "parallel".parse::<FetchMode>().unwrap_err();
        assert!(err.contains("Unknown mode"));
    }

    #[test]
    fn test_fetch_mode_display() {
        assert_eq!(FetchMode::Sequential.to_string(), "sequential");
        assert_eq!(FetchMode::Concurrent.to_string(), "concurrent");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            location_id = "700"
            mode = "sequential"
            request_delay_ms = 1500
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.location_id, "700");
        assert_eq!(config.mode, FetchMode::Sequential);
        assert_eq!(config.request_delay(), Duration::from_millis(1500));
        assert_eq!(config.max_concurrent_requests, 5);
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            location_id = "12"
            mode = "concurrent"
            request_delay_ms = 250
            max_concurrent_requests = 3
            proxy = "socks5://localhost:1080"
            timeout_secs = 5
            on_invalid_row = "skip"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.location_id, "12");
        assert_eq!(config.mode, FetchMode::Concurrent);
        assert_eq!(config.request_delay_ms, Some(250));
        assert_eq!(config.max_concurrent_requests, 3);
        assert_eq!(config.proxy, Some("socks5://localhost:1080".to_string()));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.on_invalid_row, RowPolicy::Skip);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            location_id = "55"
            max_concurrent_requests = 2
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.location_id, "55");
        assert_eq!(config.max_concurrent_requests, 2);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let err = Config::from_file("/nonexistent/path/config.toml").unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"mode = "sequential""#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.mode, FetchMode::Sequential);
    }

    #[test]
    fn test_config_with_env() {
        let saved: Vec<_> =
            ["BIDFTA_LOCATION", "BIDFTA_DELAY", "BIDFTA_MAX_CONCURRENT", "BIDFTA_PROXY"]
                .iter()
                .map(|k| (*k, std::env::var(k).ok()))
                .collect();

        std::env::set_var("BIDFTA_LOCATION", "321");
        std::env::set_var("BIDFTA_DELAY", "750");
        std::env::set_var("BIDFTA_MAX_CONCURRENT", "not_a_number");
        std::env::set_var("BIDFTA_PROXY", "http://proxy:8080");

        let config = Config::new().with_env();
        assert_eq!(config.location_id, "321");
        assert_eq!(config.request_delay_ms, Some(750));
        // Invalid values are ignored
        assert_eq!(config.max_concurrent_requests, 5);
        assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));

        for (key, value) in saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            location_id: "900".to_string(),
            mode: FetchMode::Sequential,
            request_delay_ms: Some(100),
            max_concurrent_requests: 9,
            proxy: None,
            timeout_secs: 12,
            on_invalid_row: RowPolicy::Skip,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.location_id, config.location_id);
        assert_eq!(parsed.mode, config.mode);
        assert_eq!(parsed.request_delay_ms, config.request_delay_ms);
        assert_eq!(parsed.max_concurrent_requests, config.max_concurrent_requests);
        assert_eq!(parsed.on_invalid_row, config.on_invalid_row);
    }
}
