//! Single-flight background loader for search requests.
//!
//! A [`QueryLoader`] runs at most one fetch at a time on a tokio task,
//! caches the finished [`SearchResult`], and hands it to whichever
//! [`LoadObserver`] is attached. The host drives delivery by calling
//! [`QueryLoader::pump`] (or [`QueryLoader::try_pump`]) from its own
//! thread, so observers are only ever called from there.

use std::future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::QueryError;
use crate::fetcher::HttpFetcher;
use crate::{SearchRequest, SearchResult};

/// Receives loader events. Implemented by the screen.
pub trait LoadObserver {
    /// A fetch is running for the current request.
    fn on_load_started(&mut self, request: &SearchRequest);

    fn on_load_finished(&mut self, result: &SearchResult);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoaderState {
    #[default]
    NotStarted,
    InFlight(SearchRequest),
    Completed {
        request: SearchRequest,
        result: SearchResult,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new fetch was spawned.
    Started,
    /// The request matched the cached one; the cached result was delivered.
    Redelivered,
    /// A fetch is already running; nothing was started.
    AlreadyInFlight,
}

pub struct QueryLoader<F: HttpFetcher, O: LoadObserver> {
    fetcher: Arc<F>,
    state: LoaderState,
    worker: Option<JoinHandle<SearchResult>>,
    observer: Option<O>,
}

impl<F: HttpFetcher, O: LoadObserver> QueryLoader<F, O> {
    pub fn new(fetcher: Arc<F>) -> Self {
        QueryLoader {
            fetcher,
            state: LoaderState::NotStarted,
            worker: None,
            observer: None,
        }
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, LoaderState::InFlight(_))
    }

    pub fn observer(&self) -> Option<&O> {
        self.observer.as_ref()
    }

    pub fn observer_mut(&mut self) -> Option<&mut O> {
        self.observer.as_mut()
    }

    /// Start loading `request`, unless its result is cached or another
    /// fetch is still running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, request: SearchRequest) -> StartOutcome {
        match &self.state {
            LoaderState::InFlight(running) => {
                warn!(
                    "Search for {} still running, ignoring request for {}",
                    running, request
                );
                return StartOutcome::AlreadyInFlight;
            }
            LoaderState::Completed {
                request: cached,
                result,
            } if *cached == request => {
                debug!("Redelivering cached result for {}", request);
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_load_finished(result);
                }
                return StartOutcome::Redelivered;
            }
            LoaderState::NotStarted | LoaderState::Completed { .. } => {}
        }

        info!("Starting search for {}", request);
        self.worker = Some(spawn_fetch(Arc::clone(&self.fetcher), request.clone()));
        if let Some(observer) = self.observer.as_mut() {
            observer.on_load_started(&request);
        }
        self.state = LoaderState::InFlight(request);
        StartOutcome::Started
    }

    /// Register `observer`, replacing any previous one.
    ///
    /// A cached result is delivered before this returns; a running fetch is
    /// reported as started.
    pub fn attach(&mut self, observer: O) {
        let observer = self.observer.insert(observer);
        match &self.state {
            LoaderState::NotStarted => {}
            LoaderState::InFlight(request) => observer.on_load_started(request),
            LoaderState::Completed { result, .. } => observer.on_load_finished(result),
        }
    }

    /// Stop delivering to the current observer and hand it back.
    ///
    /// A running fetch keeps going and its result is still cached.
    pub fn detach(&mut self) -> Option<O> {
        self.observer.take()
    }

    /// Wait for the running fetch and deliver its result.
    ///
    /// Never resolves while nothing is in flight, which makes it safe to
    /// use as a `tokio::select!` branch. Cancel safe.
    pub async fn pump(&mut self) {
        let Some(worker) = self.worker.as_mut() else {
            return future::pending().await;
        };
        let joined = worker.await;
        self.worker = None;
        let result = joined.unwrap_or_else(|e| {
            error!("Search task failed: {}", e);
            SearchResult::Empty
        });
        self.complete(result);
    }

    /// Deliver the running fetch's result if it is already done.
    /// Returns whether a delivery happened.
    pub fn try_pump(&mut self) -> bool {
        let Some(worker) = self.worker.as_mut() else {
            return false;
        };
        let Some(joined) = worker.now_or_never() else {
            return false;
        };
        self.worker = None;
        let result = joined.unwrap_or_else(|e| {
            error!("Search task failed: {}", e);
            SearchResult::Empty
        });
        self.complete(result);
        true
    }

    fn complete(&mut self, result: SearchResult) {
        let request = match std::mem::take(&mut self.state) {
            LoaderState::InFlight(request) => request,
            other => {
                // Only start() spawns workers, and it always moves to InFlight.
                self.state = other;
                return;
            }
        };
        info!(
            "Search for {} finished with {}",
            request,
            if result.is_empty() { "no result" } else { "a payload" }
        );
        if let Some(observer) = self.observer.as_mut() {
            observer.on_load_finished(&result);
        }
        self.state = LoaderState::Completed { request, result };
    }
}

impl<F: HttpFetcher, O: LoadObserver> Drop for QueryLoader<F, O> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            debug!("Loader destroyed with a search in flight, aborting it");
            worker.abort();
        }
    }
}

fn spawn_fetch<F: HttpFetcher>(
    fetcher: Arc<F>,
    request: SearchRequest,
) -> JoinHandle<SearchResult> {
    tokio::spawn(async move { fetch(fetcher.as_ref(), &request).await })
}

/// Load one request through `fetcher`.
///
/// Blank or malformed URLs short-circuit without touching the fetcher.
/// Every failure collapses into [`SearchResult::Empty`].
pub async fn fetch<F: HttpFetcher + ?Sized>(
    fetcher: &F,
    request: &SearchRequest,
) -> SearchResult {
    match try_fetch(fetcher, request).await {
        Ok(body) => SearchResult::Payload(body),
        Err(e) => {
            warn!("Search for '{}' yielded no result: {}", request, e);
            SearchResult::Empty
        }
    }
}

async fn try_fetch<F: HttpFetcher + ?Sized>(
    fetcher: &F,
    request: &SearchRequest,
) -> Result<String, QueryError> {
    let url = request.parse_url()?;
    let body = fetcher.get_response_text(url).await?;
    match SearchResult::from_body(body) {
        SearchResult::Payload(body) => Ok(body),
        SearchResult::Empty => Err(QueryError::EmptyBody),
    }
}
