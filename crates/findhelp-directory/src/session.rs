//! One infinite-scroll search session.
//!
//! [`SearchSession`] owns the accumulated, deduplicated results for a single
//! [`SearchQuery`]. Starting a query with a different term or location
//! discards everything and restarts at offset 0; starting the same search
//! again refetches page 0 into the existing results. At most one page request is in flight; extra `load_more` calls
//! while one is pending are no-ops. Every request carries the session
//! generation it was issued under, and a response whose generation is no
//! longer current is dropped.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use findhelp_core::{KeyValueStore, ZipTable};

use crate::client::DirectoryClient;
use crate::context::SearchContext;
use crate::dedup::ResultAccumulator;
use crate::error::DirectoryError;
use crate::query::{SearchQuery, SearchRequest};
use crate::rank::rank;
use crate::types::{Resource, ResourcePage};

/// Anything that can serve one page of search results.
pub trait ResourceSource: Send + Sync {
    fn fetch_page(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<ResourcePage, DirectoryError>> + Send;
}

impl ResourceSource for DirectoryClient {
    async fn fetch_page(&self, request: &SearchRequest) -> Result<ResourcePage, DirectoryError> {
        self.search(request).await
    }
}

/// Why a load was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotStarted,
    InFlight,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived; `added` counts items that were not duplicates.
    Loaded { added: usize, has_more: bool },
    /// Nothing was requested.
    Skipped(SkipReason),
    /// The session moved on before the response arrived; it was discarded.
    Stale,
}

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    query: Option<SearchQuery>,
    results: ResultAccumulator,
    next_offset: u32,
    has_more: bool,
    total: u64,
    in_flight: bool,
    failed: bool,
}

pub struct SearchSession<S> {
    source: S,
    page_size: u32,
    store: Option<Arc<dyn KeyValueStore>>,
    zip_table: &'static ZipTable,
    state: Mutex<SessionState>,
}

impl<S: ResourceSource> SearchSession<S> {
    /// `page_size` is held for the life of the session; zero is treated as 1.
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            store: None,
            zip_table: ZipTable::bundled(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Persist each new query as the [`SearchContext`] in `store`.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_zip_table(mut self, zip_table: &'static ZipTable) -> Self {
        self.zip_table = zip_table;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch page 0 of `query`.
    ///
    /// Results are discarded when the term or location differs from the
    /// current query. For the same search they are kept, the refetched page
    /// merges into them in first-seen order, and only the sort and origin are
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if page 0 fails. The session stays on
    /// `query` and keeps whatever it had accumulated; for a new search
    /// [`SearchSession::retry`] re-issues page 0.
    pub async fn start(&self, query: SearchQuery) -> Result<LoadOutcome, DirectoryError> {
        let context = SearchContext::from(&query);
        let request = query.page(0, self.page_size);
        let (generation, refresh) = {
            let mut state = self.lock();
            let generation = state.generation + 1;
            let refresh = state.query.as_ref().is_some_and(|q| q.same_search(&query));
            if refresh {
                state.generation = generation;
                state.query = Some(query);
                state.in_flight = true;
                state.failed = false;
            } else {
                *state = SessionState {
                    generation,
                    query: Some(query),
                    in_flight: true,
                    ..SessionState::default()
                };
            }
            (generation, refresh)
        };
        tracing::debug!(
            generation,
            refresh,
            term = request.term.value(),
            location = %request.location,
            "search session started"
        );
        self.save_context(&context);

        let result = self.source.fetch_page(&request).await;
        self.complete(generation, request.offset, result)
    }

    /// Fetch the next page if one exists and none is in flight.
    ///
    /// # Errors
    ///
    /// Returns the fetch error. Accumulated results are kept and the same
    /// offset is requested again on the next call.
    pub async fn load_more(&self) -> Result<LoadOutcome, DirectoryError> {
        let (generation, request) = {
            let mut state = self.lock();
            let Some(query) = &state.query else {
                return Ok(LoadOutcome::Skipped(SkipReason::NotStarted));
            };
            if state.in_flight {
                return Ok(LoadOutcome::Skipped(SkipReason::InFlight));
            }
            if !state.has_more {
                return Ok(LoadOutcome::Skipped(SkipReason::Exhausted));
            }
            let request = query.page(state.next_offset, self.page_size);
            state.in_flight = true;
            (state.generation, request)
        };

        let result = self.source.fetch_page(&request).await;
        self.complete(generation, request.offset, result)
    }

    /// Re-issue the page that failed last. A no-op when the last request
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, as [`SearchSession::load_more`] does.
    pub async fn retry(&self) -> Result<LoadOutcome, DirectoryError> {
        {
            let mut state = self.lock();
            if !state.failed {
                return Ok(LoadOutcome::Skipped(SkipReason::Exhausted));
            }
            // A failed page 0 never reported has_more.
            if state.next_offset == 0 {
                state.has_more = true;
            }
        }
        self.load_more().await
    }

    /// Drop the query and all results. Responses still in flight become
    /// stale.
    pub fn reset(&self) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        *state = SessionState {
            generation,
            ..SessionState::default()
        };
    }

    fn complete(
        &self,
        generation: u64,
        offset: u32,
        result: Result<ResourcePage, DirectoryError>,
    ) -> Result<LoadOutcome, DirectoryError> {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::warn!(
                generation,
                current = state.generation,
                offset,
                "discarding stale search response"
            );
            return Ok(LoadOutcome::Stale);
        }
        state.in_flight = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                state.failed = true;
                return Err(e);
            }
        };
        state.failed = false;
        let fetched = u32::try_from(page.items.len()).unwrap_or(u32::MAX);
        let end = offset.saturating_add(fetched);
        // A refetched early page must not rewind paging that went further.
        if end >= state.next_offset {
            state.next_offset = end;
            state.has_more = page.has_more;
        }
        state.total = page.total;
        let added = state.results.merge(page.items);
        tracing::debug!(
            generation,
            offset,
            fetched,
            added,
            accumulated = state.results.len(),
            has_more = state.has_more,
            "search page merged"
        );
        Ok(LoadOutcome::Loaded {
            added,
            has_more: state.has_more,
        })
    }

    fn save_context(&self, context: &SearchContext) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = context.save(store.as_ref()) {
            tracing::warn!(error = %e, "failed to persist search context");
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accumulated results in first-seen order.
    pub fn items(&self) -> Vec<Resource> {
        self.lock().results.items().to_vec()
    }

    /// Accumulated results ordered by the query's sort.
    pub fn ranked(&self) -> Vec<Resource> {
        let state = self.lock();
        match &state.query {
            Some(query) => rank(
                state.results.items(),
                query.sort_by,
                query.origin,
                self.zip_table,
            ),
            None => Vec::new(),
        }
    }

    pub fn query(&self) -> Option<SearchQuery> {
        self.lock().query.clone()
    }

    /// Whether the last fetched page reported more results.
    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.lock().in_flight
    }

    /// Whether the most recent request failed.
    pub fn has_failed(&self) -> bool {
        self.lock().failed
    }

    /// Provider total from the last fetched page.
    pub fn total(&self) -> u64 {
        self.lock().total
    }

    pub fn next_offset(&self) -> u32 {
        self.lock().next_offset
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
