//! Output types for reference tools
//!
//! These types are the return values of the resolver and tool methods. They
//! are serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::github::types::{CodeMatch, RepoContents, RepositoryRecord};
use crate::reference::manifest::PackageManifest;

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
}

/// Reference entry for one package repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "detail", rename_all = "snake_case")]
pub enum PackageInfo {
    /// Manifest was available
    Full(PackageDetails),
    /// Manifest could not be fetched; repository fields only
    Basic(RepositoryRecord),
}

impl PackageInfo {
    pub fn name(&self) -> &str {
        match self {
            Self::Full(details) => &details.repository.name,
            Self::Basic(record) => &record.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDetails {
    pub repository: RepositoryRecord,
    pub manifest: PackageManifest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme_excerpt: Option<String>,
}

/// Documentation search hit for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocResult {
    pub repository: String,
    pub path: String,
    pub url: String,
    #[serde(flatten)]
    pub body: DocBody,
}

/// Either the matching documentation or why the file could not be read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocBody {
    Documentation(String),
    Error(String),
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ListRepositoriesOutput {
    pub organization: String,
    pub captured_at: DateTime<Utc>,
    pub total: usize,
    pub repositories: Vec<RepositoryRecord>,
}

impl ListRepositoriesOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        render(self)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FileContentOutput {
    pub repository: String,
    #[serde(flatten)]
    pub contents: RepoContents,
}

impl FileContentOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        render(self)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchCodeOutput {
    pub query: String,
    pub total: usize,
    pub matches: Vec<CodeMatch>,
}

impl SearchCodeOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        render(self)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PackageReferenceOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub total: usize,
    pub packages: Vec<PackageInfo>,
}

impl PackageReferenceOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        render(self)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDocsOutput {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub total: usize,
    pub results: Vec<DocResult>,
}

impl FunctionDocsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        render(self)
    }
}

/// Flow-level failure as seen by MCP clients
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorOutput {
    pub error: String,
    pub kind: String,
}

impl ErrorOutput {
    pub fn to_json(&self) -> String {
        render(self)
    }
}

impl From<LookupError> for ErrorOutput {
    fn from(err: LookupError) -> Self {
        Self {
            kind: err.kind().to_string(),
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::mock::repository;

    #[test]
    fn test_doc_result_json_shape() {
        let found = DocResult {
            repository: "recipes".to_string(),
            path: "R/pca.R".to_string(),
            url: "https://github.com/tidymodels/recipes/blob/main/R/pca.R".to_string(),
            body: DocBody::Documentation("PCA signal extraction".to_string()),
        };
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["documentation"], "PCA signal extraction");
        assert!(json.get("error").is_none());

        let failed = DocResult {
            body: DocBody::Error("HTTP 502".to_string()),
            ..found
        };
        let json = serde_json::to_string(&failed).unwrap();
        assert!(json.contains(r#""error":"HTTP 502""#));
        let back: DocResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, failed);
    }

    #[test]
    fn test_package_info_is_tagged() {
        let basic = PackageInfo::Basic(repository("broom"));
        let json = serde_json::to_value(&basic).unwrap();
        assert_eq!(json["detail"], "basic");
        assert_eq!(json["name"], "broom");
        assert_eq!(basic.name(), "broom");
    }

    #[test]
    fn test_error_output_carries_kind() {
        let output = ErrorOutput::from(LookupError::InvalidInput("'query' must not be empty".into()));
        assert_eq!(output.kind, "invalid_input");
        assert_eq!(output.error, "Invalid input: 'query' must not be empty");
    }
}
