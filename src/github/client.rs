//! HTTP client for the GitHub REST API

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::{REPOS_PER_PAGE, ServerConfig};
use crate::error::{LookupError, Result};
use crate::github::RemoteFetcher;
use crate::github::types::{
    CodeMatch, CodeSearchResponse, ContentResponse, GitHubRepository, RepositoryRecord,
};

const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub client scoped to one organization
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    org: String,
}

impl GitHubClient {
    /// Create a client from the server configuration
    ///
    /// Requests carry a bearer token only when one is configured.
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            tracing::info!("No GitHub token configured, sending unauthenticated requests");
        }

        let user_agent = Self::format_user_agent();
        tracing::info!("Creating HTTP client with User-Agent: {}", user_agent);

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        let api_url = Url::parse(&config.api_url)?;
        if api_url.cannot_be_a_base() {
            anyhow::bail!("GitHub API URL must be a base URL: {}", config.api_url);
        }

        Ok(Self {
            client,
            api_url,
            org: config.org.clone(),
        })
    }

    /// Format the user-agent string for API compliance
    fn format_user_agent() -> String {
        format!(
            "{}/{} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            "https://github.com/tidymodels"
        )
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    /// Build an endpoint URL from raw path segments, percent-encoding each one
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::FetchFailed(format!("invalid API URL: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        Self::log_rate_limit(&response);
        let response = Self::check_response(response).await?;
        let body = response.json::<T>().await?;
        Ok(body)
    }

    fn log_rate_limit(response: &Response) {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        if let Some(remaining) = header("x-ratelimit-remaining") {
            tracing::debug!(
                "GitHub rate limit: {} remaining of {}",
                remaining,
                header("x-ratelimit-limit").unwrap_or_else(|| "?".to_string())
            );
        }
    }

    /// Map non-success statuses onto lookup errors
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        match status {
            StatusCode::NOT_FOUND => Err(LookupError::NotFound(url)),
            _ => {
                let body = response.text().await.unwrap_or_default();
                let snippet: String = body.chars().take(200).collect();
                Err(LookupError::FetchFailed(format!(
                    "HTTP {status} from {url}: {snippet}"
                )))
            }
        }
    }
}

impl RemoteFetcher for GitHubClient {
    async fn list_repositories(&self) -> Result<Vec<RepositoryRecord>> {
        let url = self.endpoint(["orgs", self.org.as_str(), "repos"])?;
        let query = [
            ("per_page", REPOS_PER_PAGE.to_string()),
            ("sort", "updated".to_string()),
        ];
        let repositories: Vec<GitHubRepository> = self.get_json(url, &query).await?;
        Ok(repositories.into_iter().map(RepositoryRecord::from).collect())
    }

    async fn get_contents(&self, repo: &str, path: &str) -> Result<ContentResponse> {
        let segments = ["repos", self.org.as_str(), repo, "contents"]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(segments)?;
        self.get_json(url, &[]).await
    }

    async fn search_code(&self, query: &str, per_page: u32) -> Result<Vec<CodeMatch>> {
        let url = self.endpoint(["search", "code"])?;
        let params = [("q", query.to_string()), ("per_page", per_page.to_string())];
        let response: CodeSearchResponse = self.get_json(url, &params).await?;
        tracing::debug!(
            "Code search '{}' returned {} of {} matches",
            query,
            response.items.len(),
            response.total_count
        );
        Ok(response
            .items
            .into_iter()
            .take(per_page as usize)
            .map(CodeMatch::from)
            .collect())
    }
}
