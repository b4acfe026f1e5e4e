use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Context, Result};

pub const DEFAULT_DIRECTORY_URL: &str =
    "https://kind.krx.co.kr/corpgeneral/corpList.do?method=download";
pub const DEFAULT_QUOTE_URL: &str = "https://api.finance.naver.com/service/itemSummary.naver";

fn default_directory_charset() -> String {
    "euc-kr".to_string()
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(4)
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Resolved crawl settings, loaded once at startup and passed into each
/// component at construction.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    pub directory_url: String,
    /// Charset the directory source declares for its HTML listing.
    #[serde(default = "default_directory_charset")]
    pub directory_charset: String,
    pub quote_url: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            directory_charset: default_directory_charset(),
            quote_url: DEFAULT_QUOTE_URL.to_string(),
            worker_count: default_worker_count(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CrawlerConfig {
    /// Load settings from a JSON file; absent optional keys fall back to
    /// their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;
        let config: CrawlerConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.directory_url.is_empty() {
            return Err(AppError::message("directory_url must not be empty"));
        }
        if self.quote_url.is_empty() {
            return Err(AppError::message("quote_url must not be empty"));
        }
        if self.worker_count == 0 {
            return Err(AppError::message("worker_count must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_defaults_for_absent_keys() {
        let raw = r#"{
            "directory_url": "http://localhost/dir",
            "quote_url": "http://localhost/quote"
        }"#;

        let config: CrawlerConfig = serde_json::from_str(raw).expect("parse config");
        assert_eq!(config.directory_charset, "euc-kr");
        assert!(config.worker_count >= 1);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn rejects_zero_workers() {
        let config = CrawlerConfig {
            worker_count: 0,
            ..CrawlerConfig::default()
        };

        let err = config.validate().expect_err("validation should fail");
        assert!(err.to_string().contains("worker_count"));
    }

    #[test]
    fn default_points_at_real_endpoints() {
        let config = CrawlerConfig::default();
        assert!(config.directory_url.starts_with("https://"));
        assert!(config.quote_url.contains("itemSummary"));
    }
}
