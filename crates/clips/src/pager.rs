//! Per-view pagination controller.
//!
//! [`ClipPager`] owns the fetch lifecycle for the currently selected
//! (camera, rule, day) view: it decides between a newest-page refresh
//! and an older-page continuation, computes the server-side offset for
//! the next page, keeps at most one fetch in flight, and discards
//! responses that resolve after the selection has moved on.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use watchpost_core::time::search_time_for_day;
use watchpost_rpc::ApplianceRpc;

use crate::cache::{ClipCache, ClipQuery, FetchParams, MergeReport};
use crate::error::PagerError;

/// Page size for every clip list request.
pub const NUM_CLIPS_PER_REQUEST: usize = 500;

/// Fetch lifecycle of the selected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// No fetch in flight; the cached snapshot is current.
    Idle,
    /// One fetch in flight. Further fetch requests are refused until
    /// it settles.
    Loading,
    /// The last fetch failed. Cleared by the next successful fetch;
    /// there is no automatic retry.
    Error(String),
}

/// What became of a fetch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was merged into the cache.
    Applied(MergeReport),
    /// A fetch was already in flight; this request did nothing.
    AlreadyLoading,
    /// The selection changed while the response was in flight; it was
    /// discarded without touching cache or state.
    Stale,
    /// Every clip the server holds for this view is already cached;
    /// no request was issued.
    Exhausted,
}

struct PagerInner {
    cache: ClipCache,
    selection: Option<ClipQuery>,
    state: ViewState,
    inflight: Option<CancellationToken>,
}

/// Pagination controller over an [`ApplianceRpc`] client.
///
/// All mutation funnels through one async mutex, so callers may share
/// the pager freely; concurrent fetch attempts collapse to a single
/// in-flight request. The lock is never held across the RPC await.
pub struct ClipPager<R> {
    rpc: Arc<R>,
    inner: Mutex<PagerInner>,
}

impl<R: ApplianceRpc> ClipPager<R> {
    pub fn new(rpc: Arc<R>) -> Self {
        Self {
            rpc,
            inner: Mutex::new(PagerInner {
                cache: ClipCache::new(),
                selection: None,
                state: ViewState::Idle,
                inflight: None,
            }),
        }
    }

    /// Switch the active view.
    ///
    /// Any in-flight fetch is marked stale so its response will be
    /// dropped when it resolves, and the state resets to idle. Cached
    /// buckets for previous views are kept.
    pub async fn select(&self, query: ClipQuery) {
        let mut inner = self.inner.lock().await;
        if let Some(token) = inner.inflight.take() {
            token.cancel();
        }
        tracing::debug!(
            camera = %query.camera,
            rule = %query.rule,
            day = %query.day,
            "Selected clip view",
        );
        inner.selection = Some(query);
        inner.state = ViewState::Idle;
    }

    /// Fetch the newest page for the selected view and merge it in.
    ///
    /// Used both for first population and for refreshing a view that
    /// may have grown since the last fetch.
    pub async fn fetch_newest(&self) -> Result<FetchOutcome, PagerError> {
        self.fetch(true).await
    }

    /// Fetch the next page of older clips for the selected view.
    ///
    /// Returns [`FetchOutcome::Exhausted`] without issuing a request
    /// when the cached bucket already reaches the oldest clip of the
    /// day.
    pub async fn load_older(&self) -> Result<FetchOutcome, PagerError> {
        self.fetch(false).await
    }

    /// Current cache snapshot. Cheap: buckets are shared, not copied.
    pub async fn snapshot(&self) -> ClipCache {
        self.inner.lock().await.cache.clone()
    }

    pub async fn state(&self) -> ViewState {
        self.inner.lock().await.state.clone()
    }

    pub async fn selection(&self) -> Option<ClipQuery> {
        self.inner.lock().await.selection.clone()
    }

    async fn fetch(&self, get_newest: bool) -> Result<FetchOutcome, PagerError> {
        // Phase one: under the lock, claim the in-flight slot and
        // compute the request from the cached bucket.
        let (query, params, search_time_secs, token) = {
            let mut inner = self.inner.lock().await;
            let query = inner
                .selection
                .clone()
                .ok_or(PagerError::NoSelection)?;

            if inner.state == ViewState::Loading {
                return Ok(FetchOutcome::AlreadyLoading);
            }

            let bucket = inner.cache.bucket(&query).map(Arc::as_ref);
            if !get_newest {
                if let Some(bucket) = bucket {
                    if bucket.remaining_older() == 0 {
                        return Ok(FetchOutcome::Exhausted);
                    }
                }
            }

            // A continuation is only meaningful against an existing
            // bucket; without one, "load older" degenerates to a
            // fresh newest fetch.
            let oldest_first = bucket.is_some() && !get_newest;
            let first_clip_index = if oldest_first {
                bucket.map_or(0, |b| next_first_clip_index(b.last_clip_index))
            } else {
                0
            };
            let search_time_secs = match bucket {
                // Continuations reuse the search time of the fetch
                // they extend, so the server paginates the same list.
                Some(b) if oldest_first => b.last_search_time_ms / 1_000,
                _ => search_time_for_day(query.day, Utc::now()),
            };

            let params = FetchParams {
                get_newest: !oldest_first,
                first_clip_index,
                num_clips: NUM_CLIPS_PER_REQUEST,
            };

            let token = CancellationToken::new();
            inner.inflight = Some(token.clone());
            inner.state = ViewState::Loading;
            (query, params, search_time_secs, token)
        };

        tracing::debug!(
            camera = %query.camera,
            rule = %query.rule,
            day = %query.day,
            first_clip_index = params.first_clip_index,
            get_newest = params.get_newest,
            "Fetching clip page",
        );

        // Phase two: the RPC await, lock released.
        let result = self
            .rpc
            .fetch_clips_for_camera_rule(
                &query.camera,
                &query.rule,
                search_time_secs,
                params.num_clips,
                params.first_clip_index,
                !params.get_newest,
            )
            .await;

        // Phase three: re-acquire and settle, unless the view moved on
        // while we were waiting.
        let mut inner = self.inner.lock().await;
        if token.is_cancelled() {
            tracing::debug!(
                camera = %query.camera,
                rule = %query.rule,
                "Dropping stale clip response",
            );
            return Ok(FetchOutcome::Stale);
        }
        inner.inflight = None;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(
                    camera = %query.camera,
                    rule = %query.rule,
                    error = %message,
                    "Clip fetch failed",
                );
                inner.state = ViewState::Error(message.clone());
                return Err(PagerError::FetchFailed(message));
            }
        };

        match inner
            .cache
            .apply_fetch_result(&query, params, &page, search_time_secs * 1_000)
        {
            Ok((cache, report)) => {
                inner.cache = cache;
                inner.state = ViewState::Idle;
                Ok(FetchOutcome::Applied(report))
            }
            Err(e) => {
                let message = e.to_string();
                inner.state = ViewState::Error(message.clone());
                Err(PagerError::FetchFailed(message))
            }
        }
    }
}

/// Offset of the next older page: one full page before the oldest
/// cached clip, clamped so the request never starts below the first
/// clip of the day.
fn next_first_clip_index(last_clip_index: i64) -> i64 {
    (last_clip_index - NUM_CLIPS_PER_REQUEST as i64).max(0)
}
