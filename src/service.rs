use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::config::ServerConfig;
use crate::github::GitHubClient;
use crate::reference::ReferenceResolver;
use crate::reference::tools::{
    GetFileContentParams, GetRepositoryParams, ListRepositoriesParams, PackageReferenceParams,
    ReferenceTools, SearchCodeParams, SearchFunctionDocsParams,
};

#[derive(Debug, Clone)]
pub struct TidymodelsService {
    reference_tools: ReferenceTools<GitHubClient>,
    tool_router: ToolRouter<Self>,
}

impl TidymodelsService {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let client = GitHubClient::new(&config)?;
        let resolver = Arc::new(ReferenceResolver::new(client, config));

        Ok(Self {
            reference_tools: ReferenceTools::new(resolver),
            tool_router: Self::tool_router(),
        })
    }
}

#[tool_router]
impl TidymodelsService {
    #[tool(
        description = "List every repository of the organization with description, stars, open issues, URL, language and last update. Served from a one-hour in-memory cache; set force_refresh to bypass it."
    )]
    pub async fn list_repositories(&self, params: Parameters<ListRepositoriesParams>) -> String {
        self.reference_tools.list_repositories(params.0).await
    }

    #[tool(
        description = "Get a single repository of the organization by its exact name. Uses the cached repository list."
    )]
    pub async fn get_repository(&self, params: Parameters<GetRepositoryParams>) -> String {
        self.reference_tools.get_repository(params.0).await
    }

    #[tool(
        description = "Get the decoded text of a file, or the listing of a directory, from a repository of the organization. Results are cached for the lifetime of the server."
    )]
    pub async fn get_file_content(&self, params: Parameters<GetFileContentParams>) -> String {
        self.reference_tools.get_file_content(params.0).await
    }

    #[tool(
        description = "Search code across the organization's repositories, optionally restricted to one repository and a path prefix. Returns up to 50 match locations with web URLs."
    )]
    pub async fn search_code(&self, params: Parameters<SearchCodeParams>) -> String {
        self.reference_tools.search_code(params.0).await
    }

    #[tool(
        description = "Build a reference for the organization's R packages: title, version, description and dependencies from each DESCRIPTION file, plus the start of the README. Filter by a substring of the package name. Packages without a readable DESCRIPTION are listed with repository fields only."
    )]
    pub async fn get_package_reference(
        &self,
        params: Parameters<PackageReferenceParams>,
    ) -> String {
        self.reference_tools.get_package_reference(params.0).await
    }

    #[tool(
        description = "Search roxygen documentation of R functions across the organization, optionally within one package. Returns, per matching file, the documentation blocks that mention the query, or 'No documentation found'."
    )]
    pub async fn search_function_docs(
        &self,
        params: Parameters<SearchFunctionDocsParams>,
    ) -> String {
        self.reference_tools.search_function_docs(params.0).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for TidymodelsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation::from_build_env(),
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            instructions: Some(format!(
                "MCP server for the '{}' GitHub organization. Use get_package_reference for an overview of its R packages, search_function_docs to find roxygen documentation for a function, and get_file_content or search_code to read source. Repository listings are cached for an hour; file contents for the life of the server.",
                self.reference_tools.resolver().config().org
            )),
            ..Default::default()
        }
    }
}
