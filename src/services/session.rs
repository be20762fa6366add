use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

use crate::{
    models::{endpoint::SearchRepositories, repository::Repository, search::SearchResult},
    services::github::{ApiError, GitHubClient, ReqwestTransport, Transport},
};

/// Page size the search API uses when `per_page` is not sent.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("search query must not be empty")]
    EmptyQuery,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Nothing was sent: a fetch is already outstanding or the results are exhausted.
    Skipped,
    Fetched { count: usize, completed: bool },
}

#[derive(Debug)]
struct SessionState {
    page: u32,
    results: Vec<Repository>,
    total_count: Option<i64>,
    completed: bool,
    in_flight: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_count: None,
            completed: false,
            in_flight: false,
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the session's in-flight flag. Dropping it unfinished (an error or a
/// cancelled future) releases the flag and leaves everything else untouched.
struct FetchGuard<'a> {
    state: &'a Mutex<SessionState>,
    page: u32,
    armed: bool,
}

impl FetchGuard<'_> {
    fn complete<R>(mut self, apply: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = lock(self.state);
        let outcome = apply(&mut state);
        state.in_flight = false;
        self.armed = false;
        outcome
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.state).in_flight = false;
        }
    }
}

/// Pagination state for one repository search query.
pub struct SearchSession<T: Transport = ReqwestTransport> {
    client: Arc<GitHubClient<T>>,
    query: String,
    page_size: u32,
    per_page: Option<u32>,
    state: Mutex<SessionState>,
}

// Shows the pagination state; the client and its transport are left out.
impl<T: Transport> fmt::Debug for SearchSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);

        f.debug_struct("SearchSession")
            .field("query", &self.query)
            .field("page_size", &self.page_size)
            .field("page", &state.page)
            .field("results", &state.results.len())
            .field("total_count", &state.total_count)
            .field("completed", &state.completed)
            .field("in_flight", &state.in_flight)
            .finish()
    }
}

impl<T: Transport> SearchSession<T> {
    pub fn initiate(client: Arc<GitHubClient<T>>, query: &str) -> Result<Self, SessionError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        Ok(Self {
            client,
            query: query.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            per_page: None,
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Requests pages of `page_size` items, clamped to what the API accepts.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self.page_size = page_size;
        self.per_page = Some(page_size);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The page the next non-reload search will fetch.
    pub fn page(&self) -> u32 {
        lock(&self.state).page
    }

    pub fn results(&self) -> Vec<Repository> {
        lock(&self.state).results.clone()
    }

    pub fn result_count(&self) -> usize {
        lock(&self.state).results.len()
    }

    pub fn total_count(&self) -> Option<i64> {
        lock(&self.state).total_count
    }

    pub fn is_completed(&self) -> bool {
        lock(&self.state).completed
    }

    pub fn is_fetching(&self) -> bool {
        lock(&self.state).in_flight
    }

    fn claim(&self, reload: bool) -> Option<FetchGuard<'_>> {
        let mut state = lock(&self.state);

        if state.in_flight {
            tracing::debug!("Search for '{}' skipped: fetch already in flight", self.query);
            return None;
        }

        if state.completed && !reload {
            tracing::debug!("Search for '{}' skipped: results exhausted", self.query);
            return None;
        }

        state.in_flight = true;

        Some(FetchGuard {
            state: &self.state,
            page: if reload { 1 } else { state.page },
            armed: true,
        })
    }

    /// Fetches the next page, or page 1 again when `reload` is set.
    ///
    /// The in-flight flag is claimed when this is called, not when the returned
    /// future is first polled, so a second call made before the first resolves
    /// always sees it. Session state changes only once a page has been fetched
    /// and decoded; on any error it is left exactly as it was.
    pub fn search(
        &self,
        reload: bool,
    ) -> impl Future<Output = Result<SearchOutcome, SessionError>> + Send + '_ {
        let claim = self.claim(reload);

        async move {
            let Some(guard) = claim else {
                return Ok(SearchOutcome::Skipped);
            };

            let mut endpoint = SearchRepositories::new(&self.query, guard.page);
            if let Some(per_page) = self.per_page {
                endpoint = endpoint.with_per_page(per_page);
            }

            let response = self.client.request(&endpoint).await.map_err(|e| {
                tracing::warn!("Search for '{}' page {} failed: {}", self.query, guard.page, e);
                SessionError::from(e)
            })?;

            let page = guard.page;
            let outcome = guard.complete(|state| self.apply_page(state, page, reload, response));

            Ok(outcome)
        }
    }

    /// Fetches up to `max_pages` further pages, stopping early once the results
    /// are exhausted. Returns how many pages were fetched. On error the pages
    /// already fetched stay in [`results`](Self::results).
    pub async fn search_pages(&self, max_pages: u32) -> Result<u32, SessionError> {
        let mut fetched = 0;

        while fetched < max_pages {
            match self.search(false).await? {
                SearchOutcome::Fetched { completed, .. } => {
                    fetched += 1;
                    if completed {
                        break;
                    }
                }
                SearchOutcome::Skipped => break,
            }
        }

        Ok(fetched)
    }

    /// Callback flavour of [`search`](Self::search). `on_complete` receives
    /// `None` on success and the error otherwise; it is not called when the
    /// search is skipped. Returns whether a fetch was made.
    pub async fn search_with<F>(&self, reload: bool, on_complete: F) -> bool
    where
        F: FnOnce(Option<&SessionError>),
    {
        match self.search(reload).await {
            Ok(SearchOutcome::Skipped) => false,
            Ok(SearchOutcome::Fetched { .. }) => {
                on_complete(None);
                true
            }
            Err(e) => {
                on_complete(Some(&e));
                true
            }
        }
    }

    fn apply_page(
        &self,
        state: &mut SessionState,
        page: u32,
        reload: bool,
        response: SearchResult<Repository>,
    ) -> SearchOutcome {
        let count = response.items.len();

        if reload {
            state.results.clear();
        }

        state.results.extend(response.items);
        state.total_count = Some(response.total_count);
        state.page = page + 1;
        state.completed = count < self.page_size as usize
            || response.incomplete_results
            || state.results.len() as i64 >= response.total_count;

        tracing::info!(
            "Search for '{}' page {}: {} items ({} of {} total){}",
            self.query,
            page,
            count,
            state.results.len(),
            response.total_count,
            if state.completed { ", completed" } else { "" }
        );

        SearchOutcome::Fetched {
            count,
            completed: state.completed,
        }
    }
}
