//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default number of rows per page on a freshly mounted screen
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Maximum number of rows per page
pub const MAX_PAGE_SIZE: usize = 100;

/// Default minimum fuzzy score for the global search
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Repository backend (mock, remote)
    pub repository_provider: String,

    /// Base URL of the REST backend, required for the remote provider
    pub api_base_url: Option<String>,

    /// Bearer token sent to the REST backend
    pub api_token: Option<String>,

    /// Collection view defaults
    pub default_page_size: usize,
    pub fuzzy_threshold: f64,

    /// Runtime configuration
    pub log_format: String,
    pub rust_log: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("repository_provider", &self.repository_provider)
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("default_page_size", &self.default_page_size)
            .field("fuzzy_threshold", &self.fuzzy_threshold)
            .field("log_format", &self.log_format)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository_provider: "mock".to_string(),
            api_base_url: None,
            api_token: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            log_format: "pretty".to_string(),
            rust_log: "atrium=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let repository_provider =
            env::var("ATRIUM_REPOSITORY_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let api_base_url = env::var("ATRIUM_API_BASE_URL").ok();

        if repository_provider == "remote" && api_base_url.is_none() {
            return Err(anyhow::anyhow!(
                "ATRIUM_API_BASE_URL is required for the remote repository provider"
            ));
        }

        let config = Self {
            repository_provider,
            api_base_url,
            api_token: env::var("ATRIUM_API_TOKEN").ok(),

            default_page_size: env::var("ATRIUM_DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            fuzzy_threshold: env::var("ATRIUM_FUZZY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|t| t.is_finite())
                .unwrap_or(DEFAULT_FUZZY_THRESHOLD)
                .clamp(0.0, 1.0),

            log_format: env::var("ATRIUM_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "atrium=info".to_string()),
        };

        Ok(config)
    }
}
