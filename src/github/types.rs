//! GitHub REST API response types
//!
//! Responses are validated here, at the fetch boundary. Nullable upstream
//! fields become `Option`s; anything else missing fails deserialization.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, Result};

/// One repository of the organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub open_issues: u64,
    /// Web page of the repository
    pub url: String,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Repository object from `GET /orgs/{org}/repos`
///
/// GitHub sends `url` and `html_url`, and `open_issues` next to
/// `open_issues_count`; only the fields kept in [`RepositoryRecord`] are read.
#[derive(Debug, Deserialize)]
pub(crate) struct GitHubRepository {
    pub name: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub open_issues_count: u64,
    pub html_url: String,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<GitHubRepository> for RepositoryRecord {
    fn from(repo: GitHubRepository) -> Self {
        Self {
            name: repo.name,
            description: repo.description,
            stars: repo.stargazers_count,
            open_issues: repo.open_issues_count,
            url: repo.html_url,
            language: repo.language,
            updated_at: repo.updated_at,
        }
    }
}

/// Body of `GET /repos/{owner}/{repo}/contents/{path}`
///
/// GitHub answers with an array for directories and an object for files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentResponse {
    Directory(Vec<DirectoryEntry>),
    File(FileDescriptor),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    pub encoding: Option<String>,
    pub content: Option<String>,
}

impl FileDescriptor {
    /// Decode the transported payload into UTF-8 text
    pub fn decode(&self) -> Result<String> {
        let content = self.content.as_deref().unwrap_or_default();
        match self.encoding.as_deref() {
            Some("base64") => {
                // GitHub wraps base64 payloads at 60 columns
                let compact: String = content.split_whitespace().collect();
                let bytes = STANDARD.decode(compact).map_err(|e| {
                    LookupError::FetchFailed(format!("invalid base64 content in {}: {e}", self.path))
                })?;
                String::from_utf8(bytes).map_err(|_| {
                    LookupError::FetchFailed(format!("{} is not valid UTF-8 text", self.path))
                })
            }
            Some(other) => Err(LookupError::FetchFailed(format!(
                "unsupported content encoding '{other}' for {}",
                self.path
            ))),
            None => Ok(content.to_string()),
        }
    }
}

/// Decoded contents of a repository path, as held by the content cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepoContents {
    File { path: String, text: String },
    Directory { path: String, entries: Vec<DirectoryEntry> },
}

impl RepoContents {
    /// Convert a raw contents response for `path`
    pub fn from_response(path: &str, response: ContentResponse) -> Result<Self> {
        match response {
            ContentResponse::File(file) => Ok(Self::File {
                text: file.decode()?,
                path: file.path,
            }),
            ContentResponse::Directory(entries) => Ok(Self::Directory {
                path: path.to_string(),
                entries,
            }),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::File { text, .. } => Some(text),
            Self::Directory { .. } => None,
        }
    }
}

/// Body of `GET /search/code`
#[derive(Debug, Deserialize)]
pub(crate) struct CodeSearchResponse {
    pub total_count: u64,
    pub items: Vec<CodeSearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CodeSearchItem {
    pub path: String,
    pub html_url: String,
    pub repository: SearchRepository,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchRepository {
    pub name: String,
}

/// Location of one code-search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMatch {
    pub repository: String,
    pub path: String,
    pub url: String,
}

impl From<CodeSearchItem> for CodeMatch {
    fn from(item: CodeSearchItem) -> Self {
        Self {
            repository: item.repository.name,
            path: item.path,
            url: item.html_url,
        }
    }
}
