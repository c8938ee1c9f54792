use std::sync::Arc;

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::github::RemoteFetcher;
use crate::reference::ReferenceResolver;
use crate::reference::outputs::{
    ErrorOutput, FileContentOutput, FunctionDocsOutput, ListRepositoriesOutput,
    PackageReferenceOutput, SearchCodeOutput,
};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListRepositoriesParams {
    #[schemars(
        description = "Bypass the one-hour repository cache and fetch a fresh list from GitHub (default: false)"
    )]
    pub force_refresh: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetRepositoryParams {
    #[schemars(description = "Exact repository name (e.g., 'recipes')")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetFileContentParams {
    #[schemars(description = "Repository name within the organization (e.g., 'parsnip')")]
    pub repo: String,
    #[schemars(
        description = "Path within the repository (e.g., 'R/fit.R'). Leave empty to list the repository root"
    )]
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchCodeParams {
    #[schemars(description = "Code search terms (e.g., 'step_normalize')")]
    pub query: String,
    #[schemars(description = "Optional repository to restrict the search to")]
    pub repo: Option<String>,
    #[schemars(description = "Optional path prefix to restrict the search to (e.g., 'R/')")]
    pub path: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct PackageReferenceParams {
    #[schemars(
        description = "Only include packages whose name contains this text (case-sensitive). Omit for all packages"
    )]
    pub package: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchFunctionDocsParams {
    #[schemars(description = "Text to look for in roxygen documentation (case-insensitive)")]
    pub query: String,
    #[schemars(description = "Optional package (repository) to restrict the search to")]
    pub package: Option<String>,
}

/// Tool entry points rendering resolver results as JSON
#[derive(Debug)]
pub struct ReferenceTools<F> {
    resolver: Arc<ReferenceResolver<F>>,
}

impl<F> Clone for ReferenceTools<F> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<F: RemoteFetcher> ReferenceTools<F> {
    pub fn new(resolver: Arc<ReferenceResolver<F>>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ReferenceResolver<F> {
        &self.resolver
    }

    pub async fn list_repositories(&self, params: ListRepositoriesParams) -> String {
        match self
            .resolver
            .repositories(params.force_refresh.unwrap_or(false))
            .await
        {
            Ok(snapshot) => ListRepositoriesOutput {
                organization: self.resolver.config().org.clone(),
                captured_at: snapshot.captured_at,
                total: snapshot.repositories.len(),
                repositories: snapshot.repositories.clone(),
            }
            .to_json(),
            Err(e) => ErrorOutput::from(e).to_json(),
        }
    }

    pub async fn get_repository(&self, params: GetRepositoryParams) -> String {
        match self.resolver.repository(&params.name).await {
            Ok(record) => serde_json::to_string(&record)
                .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string()),
            Err(e) => ErrorOutput::from(e).to_json(),
        }
    }

    pub async fn get_file_content(&self, params: GetFileContentParams) -> String {
        match self.resolver.file_content(&params.repo, &params.path).await {
            Ok(contents) => FileContentOutput {
                repository: params.repo,
                contents: contents.as_ref().clone(),
            }
            .to_json(),
            Err(e) => ErrorOutput::from(e).to_json(),
        }
    }

    pub async fn search_code(&self, params: SearchCodeParams) -> String {
        match self
            .resolver
            .search_code(&params.query, params.repo.as_deref(), params.path.as_deref())
            .await
        {
            Ok(matches) => SearchCodeOutput {
                query: params.query,
                total: matches.len(),
                matches,
            }
            .to_json(),
            Err(e) => ErrorOutput::from(e).to_json(),
        }
    }

    pub async fn get_package_reference(&self, params: PackageReferenceParams) -> String {
        match self.resolver.package_reference(params.package.as_deref()).await {
            Ok(packages) => PackageReferenceOutput {
                filter: params.package,
                total: packages.len(),
                packages,
            }
            .to_json(),
            Err(e) => ErrorOutput::from(e).to_json(),
        }
    }

    pub async fn search_function_docs(&self, params: SearchFunctionDocsParams) -> String {
        match self
            .resolver
            .search_function_docs(&params.query, params.package.as_deref())
            .await
        {
            Ok(results) => FunctionDocsOutput {
                query: params.query,
                package: params.package,
                total: results.len(),
                results,
            }
            .to_json(),
            Err(e) => ErrorOutput::from(e).to_json(),
        }
    }
}
