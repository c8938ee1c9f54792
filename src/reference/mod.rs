//! # Reference Module
//!
//! Package reference and documentation lookups built on the caches and the
//! fan-out helper.
//!
//! - [`manifest`] - `DESCRIPTION` parsing
//! - [`roxygen`] - roxygen block extraction
//! - [`outputs`] - result types
//! - [`tools`] - MCP tool parameters and JSON rendering

pub mod manifest;
pub mod outputs;
pub mod roxygen;
pub mod tools;

use std::sync::Arc;

use crate::cache::{CacheSnapshot, ContentCache, ContentKey, RepositoryCache};
use crate::config::{
    DOC_FILE_EXTENSION, MANIFEST_PATH, README_EXCERPT_CHARS, README_PATH, SEARCH_RESULT_LIMIT,
    ServerConfig, TRUNCATION_MARKER,
};
use crate::error::{LookupError, Result, require};
use crate::fanout::{fan_out, settled_counts};
use crate::github::RemoteFetcher;
use crate::github::types::{CodeMatch, RepoContents, RepositoryRecord};
use manifest::PackageManifest;
use outputs::{DocBody, DocResult, PackageDetails, PackageInfo};

/// Resolves lookups against one GitHub organization
///
/// Owns both caches; they are created empty here and dropped with the
/// resolver.
#[derive(Debug)]
pub struct ReferenceResolver<F> {
    fetcher: F,
    config: ServerConfig,
    repositories: RepositoryCache,
    contents: ContentCache,
}

impl<F: RemoteFetcher> ReferenceResolver<F> {
    pub fn new(fetcher: F, config: ServerConfig) -> Self {
        Self {
            fetcher,
            repositories: RepositoryCache::new(config.repo_ttl),
            contents: ContentCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn content_cache(&self) -> &ContentCache {
        &self.contents
    }

    /// The organization's repositories, served from cache while fresh
    pub async fn repositories(&self, force_refresh: bool) -> Result<Arc<CacheSnapshot>> {
        self.repositories.get(&self.fetcher, force_refresh).await
    }

    /// One repository from the cached list, by exact name
    pub async fn repository(&self, name: &str) -> Result<RepositoryRecord> {
        require(name, "name")?;
        let snapshot = self.repositories(false).await?;
        snapshot
            .repositories
            .iter()
            .find(|record| record.name == name)
            .cloned()
            .ok_or_else(|| {
                LookupError::NotFound(format!(
                    "repository '{name}' in organization '{}'",
                    self.config.org
                ))
            })
    }

    /// File text or directory listing at `path`, cached per `(repo, path)`
    pub async fn file_content(&self, repo: &str, path: &str) -> Result<Arc<RepoContents>> {
        require(repo, "repo")?;
        let path = path.trim_matches('/');
        let key = ContentKey::new(repo, path);
        self.contents
            .get_or_fetch(&key, move || async move {
                let response = self.fetcher.get_contents(repo, path).await?;
                RepoContents::from_response(path, response)
            })
            .await
    }

    async fn file_text(&self, repo: &str, path: &str) -> Result<String> {
        let contents = self.file_content(repo, path).await?;
        contents
            .text()
            .map(str::to_string)
            .ok_or_else(|| LookupError::NotFound(format!("{repo}/{path} is a directory")))
    }

    /// Raw code search scoped to the organization, uncached
    pub async fn search_code(
        &self,
        query: &str,
        repo: Option<&str>,
        path: Option<&str>,
    ) -> Result<Vec<CodeMatch>> {
        require(query, "query")?;
        let mut scoped = format!("{} org:{}", query.trim(), self.config.org);
        if let Some(repo) = non_empty(repo) {
            scoped.push_str(&format!(" repo:{}/{repo}", self.config.org));
        }
        if let Some(path) = non_empty(path) {
            scoped.push_str(&format!(" path:{path}"));
        }
        self.fetcher.search_code(&scoped, SEARCH_RESULT_LIMIT).await
    }

    /// Reference entries for every repository whose name contains `filter`
    ///
    /// Per-repository failures degrade to [`PackageInfo::Basic`]; only an
    /// unavailable repository list fails the whole call.
    pub async fn package_reference(&self, filter: Option<&str>) -> Result<Vec<PackageInfo>> {
        let snapshot = self.repositories(false).await?;
        let selected: Vec<RepositoryRecord> = snapshot
            .repositories
            .iter()
            .filter(|record| filter.is_none_or(|f| record.name.contains(f)))
            .cloned()
            .collect();

        tracing::info!(
            "Building package reference for {} of {} repositories",
            selected.len(),
            snapshot.repositories.len()
        );

        let settled = fan_out(
            selected.clone(),
            self.config.max_concurrency,
            move |record| async move { self.describe_package(&record).await },
        )
        .await;

        let (ok, failed) = settled_counts(&settled);
        tracing::debug!("Package reference: {} with manifest, {} basic", ok, failed);

        Ok(settled
            .into_iter()
            .zip(selected)
            .map(|(outcome, record)| {
                outcome.unwrap_or_else(|e| {
                    tracing::debug!("No manifest for {}, using repository fields: {}", record.name, e);
                    PackageInfo::Basic(record)
                })
            })
            .collect())
    }

    /// Manifest and readme for one repository; fails when the manifest does
    async fn describe_package(&self, record: &RepositoryRecord) -> Result<PackageInfo> {
        let (manifest, readme) = futures::join!(
            self.file_text(&record.name, MANIFEST_PATH),
            self.file_text(&record.name, README_PATH)
        );

        let manifest =
            PackageManifest::parse(&manifest?).with_fallback_description(record.description.as_deref());
        let readme_excerpt = match readme {
            Ok(text) => Some(excerpt(&text, README_EXCERPT_CHARS)),
            Err(e) => {
                tracing::debug!("No readme for {}: {}", record.name, e);
                None
            }
        };

        Ok(PackageInfo::Full(PackageDetails {
            repository: record.clone(),
            manifest,
            readme_excerpt,
        }))
    }

    /// Roxygen documentation mentioning `query`, from files found by code search
    pub async fn search_function_docs(
        &self,
        query: &str,
        package: Option<&str>,
    ) -> Result<Vec<DocResult>> {
        require(query, "query")?;
        let query = query.trim();
        let search = self.doc_search_query(query, non_empty(package));
        let matches = self.fetcher.search_code(&search, SEARCH_RESULT_LIMIT).await?;
        tracing::info!("Documentation search '{}' matched {} files", search, matches.len());

        let settled = fan_out(
            matches.clone(),
            self.config.max_concurrency,
            move |hit| async move { self.file_text(&hit.repository, &hit.path).await },
        )
        .await;

        Ok(matches
            .into_iter()
            .zip(settled)
            .map(|(hit, outcome)| {
                let body = match outcome {
                    Ok(source) => DocBody::Documentation(roxygen::render_documentation(&source, query)),
                    Err(e) => DocBody::Error(format!("Failed to fetch {}: {e}", hit.path)),
                };
                DocResult {
                    repository: hit.repository,
                    path: hit.path,
                    url: hit.url,
                    body,
                }
            })
            .collect())
    }

    fn doc_search_query(&self, query: &str, package: Option<&str>) -> String {
        let org = &self.config.org;
        match package {
            Some(package) => {
                format!("{query} org:{org} repo:{org}/{package} extension:{DOC_FILE_EXTENSION}")
            }
            None => format!("{query} org:{org} extension:{DOC_FILE_EXTENSION}"),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// First `max_chars` characters of `text`, marked when anything was cut
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}
