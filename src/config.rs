//! Runtime configuration and fixed lookup constants

use std::time::Duration;

pub const DEFAULT_ORG: &str = "tidymodels";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository list time-to-live
pub const DEFAULT_REPO_TTL_SECS: u64 = 3600;
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// File names probed in every package repository
pub const MANIFEST_PATH: &str = "DESCRIPTION";
pub const README_PATH: &str = "README.md";

pub const README_EXCERPT_CHARS: usize = 1000;
pub const TRUNCATION_MARKER: &str = "...";

/// Page sizes sent to GitHub
pub const REPOS_PER_PAGE: u32 = 100;
pub const SEARCH_RESULT_LIMIT: u32 = 50;

/// Source files searched for roxygen documentation
pub const DOC_FILE_EXTENSION: &str = "R";
pub const NO_DOCUMENTATION: &str = "No documentation found";

/// Settings for one server instance
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub org: String,
    pub api_url: String,
    pub token: Option<String>,
    pub repo_ttl: Duration,
    pub max_concurrency: usize,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            org: DEFAULT_ORG.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            repo_ttl: Duration::from_secs(DEFAULT_REPO_TTL_SECS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
