//! # GitHub Module
//!
//! The remote side of every lookup: one outbound call to the GitHub REST API
//! per operation, returning typed data or a [`LookupError`](crate::error::LookupError).
//!
//! - [`client`] - reqwest-backed [`GitHubClient`]
//! - [`types`] - response types validated at the fetch boundary

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;

use crate::error::Result;
use types::{CodeMatch, ContentResponse, RepositoryRecord};

pub use client::GitHubClient;

/// A single outbound call to the organization's GitHub API
///
/// Implementations own their own timeout; a timed-out call is a failure like
/// any other.
pub trait RemoteFetcher: Send + Sync {
    /// List the organization's repositories, most recently updated first
    fn list_repositories(&self) -> impl Future<Output = Result<Vec<RepositoryRecord>>> + Send;

    /// Fetch a file descriptor or directory listing from one repository
    fn get_contents(
        &self,
        repo: &str,
        path: &str,
    ) -> impl Future<Output = Result<ContentResponse>> + Send;

    /// Run a code search, returning at most `per_page` match locations
    fn search_code(
        &self,
        query: &str,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<CodeMatch>>> + Send;
}
