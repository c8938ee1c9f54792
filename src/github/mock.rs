//! In-memory fetcher for unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{TimeZone, Utc};

use crate::error::{LookupError, Result};
use crate::github::RemoteFetcher;
use crate::github::types::{CodeMatch, ContentResponse, FileDescriptor, RepositoryRecord};

enum MockFile {
    Text { text: String, delay: Duration },
    Failure(LookupError),
}

/// Scripted fetcher that counts every call
///
/// Unknown files answer `NotFound`, like GitHub does.
pub(crate) struct MockFetcher {
    repositories: Mutex<Result<Vec<RepositoryRecord>>>,
    repo_delay: Mutex<Duration>,
    files: Mutex<HashMap<(String, String), MockFile>>,
    search_results: Mutex<Vec<CodeMatch>>,
    search_queries: Mutex<Vec<String>>,
    repo_calls: AtomicUsize,
    content_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            repositories: Mutex::new(Ok(Vec::new())),
            repo_delay: Mutex::new(Duration::ZERO),
            files: Mutex::new(HashMap::new()),
            search_results: Mutex::new(Vec::new()),
            search_queries: Mutex::new(Vec::new()),
            repo_calls: AtomicUsize::new(0),
            content_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_repositories(names: &[&str]) -> Self {
        let fetcher = Self::new();
        fetcher.set_repositories(Ok(names.iter().map(|n| repository(n)).collect()));
        fetcher
    }

    pub fn set_repositories(&self, result: Result<Vec<RepositoryRecord>>) {
        *self.repositories.lock().unwrap() = result;
    }

    pub fn set_repo_delay(&self, delay: Duration) {
        *self.repo_delay.lock().unwrap() = delay;
    }

    pub fn add_file(&self, repo: &str, path: &str, text: &str) {
        self.add_delayed_file(repo, path, text, Duration::ZERO);
    }

    pub fn add_delayed_file(&self, repo: &str, path: &str, text: &str, delay: Duration) {
        self.files.lock().unwrap().insert(
            (repo.to_string(), path.to_string()),
            MockFile::Text {
                text: text.to_string(),
                delay,
            },
        );
    }

    pub fn fail_file(&self, repo: &str, path: &str, err: LookupError) {
        self.files
            .lock()
            .unwrap()
            .insert((repo.to_string(), path.to_string()), MockFile::Failure(err));
    }

    pub fn add_search_match(&self, repo: &str, path: &str) {
        self.search_results.lock().unwrap().push(CodeMatch {
            repository: repo.to_string(),
            path: path.to_string(),
            url: format!("https://github.com/tidymodels/{repo}/blob/main/{path}"),
        });
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    pub fn repo_calls(&self) -> usize {
        self.repo_calls.load(Ordering::SeqCst)
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

/// A repository record with fixed counters and timestamp
pub(crate) fn repository(name: &str) -> RepositoryRecord {
    RepositoryRecord {
        name: name.to_string(),
        description: Some(format!("The {name} package")),
        stars: 100,
        open_issues: 5,
        url: format!("https://github.com/tidymodels/{name}"),
        language: Some("R".to_string()),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

impl RemoteFetcher for MockFetcher {
    async fn list_repositories(&self) -> Result<Vec<RepositoryRecord>> {
        self.repo_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.repo_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.repositories.lock().unwrap().clone()
    }

    async fn get_contents(&self, repo: &str, path: &str) -> Result<ContentResponse> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        let entry = {
            let files = self.files.lock().unwrap();
            match files.get(&(repo.to_string(), path.to_string())) {
                Some(MockFile::Text { text, delay }) => Ok((text.clone(), *delay)),
                Some(MockFile::Failure(err)) => Err(err.clone()),
                None => Err(LookupError::NotFound(format!(
                    "/repos/tidymodels/{repo}/contents/{path}"
                ))),
            }
        };
        let (text, delay) = entry?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(ContentResponse::File(FileDescriptor {
            path: path.to_string(),
            encoding: Some("base64".to_string()),
            content: Some(STANDARD.encode(text)),
        }))
    }

    async fn search_code(&self, query: &str, per_page: u32) -> Result<Vec<CodeMatch>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.search_queries.lock().unwrap().push(query.to_string());
        let results = self.search_results.lock().unwrap();
        Ok(results.iter().take(per_page as usize).cloned().collect())
    }
}
