//! Error types shared by the fetcher, the caches and the resolver

use thiserror::Error;

/// Failure of a single lookup
///
/// Per-item failures inside a fan-out are carried as values of this type;
/// only flow-level failures are returned to the caller of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Network, status or decoding failure talking to GitHub
    #[error("GitHub request failed: {0}")]
    FetchFailed(String),

    /// The named entity does not exist upstream or in the cached collection
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required argument was missing or empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LookupError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => "fetch_failed",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        Self::FetchFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;

/// Reject a missing or blank required argument
pub fn require(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LookupError::InvalidInput(format!("'{name}' must not be empty")));
    }
    Ok(())
}
