//! Layered clip cache and the page-merge algorithm.
//!
//! Buckets are keyed camera → rule → day. Each [`DayBucket`] holds the
//! clips fetched so far for that view, newest first, plus the
//! bookkeeping needed to request the next older page. Merging is the
//! delicate part: two independently fetched windows of a server-side
//! list that may have grown (or, worse, shifted) between calls have to
//! land in one ordered map without duplicate identities and without
//! silently hiding a gap.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use watchpost_core::{ClipKey, ClipRecord, DayKey};
use watchpost_rpc::ClipPage;

use crate::error::ClipCacheError;

/// Identifies one (camera, rule, calendar-day) clip view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipQuery {
    pub camera: String,
    pub rule: String,
    pub day: DayKey,
}

impl ClipQuery {
    pub fn new(camera: impl Into<String>, rule: impl Into<String>, day: DayKey) -> Self {
        Self {
            camera: camera.into(),
            rule: rule.into(),
            day,
        }
    }
}

/// The request parameters a merge needs in order to interpret the
/// response it is applying.
#[derive(Debug, Clone, Copy)]
pub struct FetchParams {
    /// True for a "fetch newest" request, false for a "load older"
    /// continuation.
    pub get_newest: bool,
    /// Absolute index of the first clip requested (0 = oldest of day).
    pub first_clip_index: i64,
    /// Page size that was requested.
    pub num_clips: usize,
}

/// Evidence that a freshly fetched newest page may not be contiguous
/// with previously cached history. The merge proceeds anyway; this is
/// a diagnostic, not a refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGap {
    /// Estimated record count between the two windows.
    pub clip_gap: i64,
    /// Whether the oldest previously cached clip key reappeared in the
    /// new page.
    pub oldest_old_clip_in_new_page: bool,
}

/// Outcome of a successful merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Clip identities added by this merge.
    pub appended: usize,
    /// Bucket size after the merge.
    pub bucket_len: usize,
    /// Set when a newest re-fetch could not be proven contiguous with
    /// cached history.
    pub inconsistency: Option<WindowGap>,
}

/// Pagination bookkeeping and ordered clips for one clip view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBucket {
    /// Search timestamp (ms) of the most recent fetch applied here.
    pub last_search_time_ms: i64,
    /// Absolute server-side index of the oldest clip currently held
    /// (0 = oldest clip that exists for the day).
    pub last_clip_index: i64,
    /// Total count the server reported when this bucket was populated.
    pub initial_clip_count: i64,
    /// Total count the server reported on the latest fetch. Grows as
    /// the appliance keeps recording.
    pub current_clip_count: i64,
    /// Clip records keyed by identity, newest first.
    pub clips: IndexMap<ClipKey, ClipRecord>,
}

impl DayBucket {
    /// How many older clips remain unfetched on the server, clamped
    /// to zero.
    pub fn remaining_older(&self) -> i64 {
        self.last_clip_index.max(0)
    }

    /// Whether the server holds clips this bucket has not fetched yet.
    pub fn has_older(&self) -> bool {
        (self.clips.len() as i64) < self.current_clip_count
    }
}

/// Layered mapping camera → rule → day → shared [`DayBucket`].
///
/// Treated as copy-on-write: [`apply_fetch_result`] returns a new
/// cache value and leaves `self` untouched, so readers holding an
/// earlier snapshot never observe a half-applied merge. Buckets are
/// shared between snapshots via `Arc`. Entries are created lazily and
/// never evicted; the cache lives for the session.
///
/// [`apply_fetch_result`]: ClipCache::apply_fetch_result
#[derive(Debug, Clone, Default)]
pub struct ClipCache {
    cameras: HashMap<String, HashMap<String, HashMap<DayKey, Arc<DayBucket>>>>,
}

impl ClipCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a bucket exists for the given view. Gates every other
    /// read.
    pub fn has_bucket(&self, query: &ClipQuery) -> bool {
        self.bucket(query).is_some()
    }

    pub fn bucket(&self, query: &ClipQuery) -> Option<&Arc<DayBucket>> {
        self.cameras
            .get(&query.camera)?
            .get(&query.rule)?
            .get(&query.day)
    }

    /// Server-reported total for the view, 0 when nothing is cached.
    pub fn clip_count(&self, query: &ClipQuery) -> i64 {
        self.bucket(query).map_or(0, |b| b.current_clip_count)
    }

    /// Merge one fetched page into the cache, returning the updated
    /// snapshot and a report of what happened.
    ///
    /// A `success = false` envelope is rejected outright. Otherwise
    /// the merge follows the request direction:
    ///
    /// - fresh population, or an explicit newest refresh, rebuilds the
    ///   head of the bucket from the page (newest-first server order);
    ///   when history already exists the new entries are placed before
    ///   it, fresh records win identity collisions, and a
    ///   non-contiguous window is flagged in the report rather than
    ///   repaired;
    /// - a "load older" continuation appends the page after the
    ///   existing entries, oldest last, and known identities keep the
    ///   record already cached.
    pub fn apply_fetch_result(
        &self,
        query: &ClipQuery,
        params: FetchParams,
        page: &ClipPage,
        request_time_ms: i64,
    ) -> Result<(ClipCache, MergeReport), ClipCacheError> {
        if !page.success {
            return Err(ClipCacheError::FetchFailed);
        }

        let existing = self.bucket(query).map(Arc::as_ref);
        let prior_len = existing.map_or(0, |b| b.clips.len());

        let mut inconsistency = None;
        let bucket = match existing {
            Some(old) if !params.get_newest => continuation_merge(old, params, page),
            old => {
                let new_map = page_to_map(page);
                match old {
                    Some(old) => {
                        inconsistency = detect_window_gap(query, old, params, page, &new_map);
                        newest_remerge(old, page, new_map)
                    }
                    None => fresh_bucket(page, new_map),
                }
            }
        };

        let mut bucket = bucket;
        bucket.last_search_time_ms = request_time_ms;
        bucket.current_clip_count = page.total_count;

        let report = MergeReport {
            appended: bucket.clips.len().saturating_sub(prior_len),
            bucket_len: bucket.clips.len(),
            inconsistency,
        };

        tracing::debug!(
            camera = %query.camera,
            rule = %query.rule,
            day = %query.day,
            appended = report.appended,
            bucket_len = report.bucket_len,
            total = page.total_count,
            "Applied clip page",
        );

        let mut next = self.clone();
        next.cameras
            .entry(query.camera.clone())
            .or_default()
            .entry(query.rule.clone())
            .or_default()
            .insert(query.day, Arc::new(bucket));

        Ok((next, report))
    }
}

/// Build the keyed map for a newest-first page, dropping entries whose
/// absolute index would fall below zero (the server cannot actually
/// hold more clips than its reported total).
fn page_to_map(page: &ClipPage) -> IndexMap<ClipKey, ClipRecord> {
    let mut map = IndexMap::with_capacity(page.clips.len());
    for (index, clip) in page.clips.iter().enumerate() {
        let clip_index = page.total_count - 1 - index as i64;
        if clip_index < 0 {
            break;
        }
        map.insert(clip.key(), clip.clone());
    }
    map
}

/// First population of a view.
fn fresh_bucket(page: &ClipPage, new_map: IndexMap<ClipKey, ClipRecord>) -> DayBucket {
    let last_clip_index = (page.total_count - new_map.len() as i64).max(0);
    DayBucket {
        last_clip_index,
        initial_clip_count: page.total_count,
        clips: new_map,
        ..Default::default()
    }
}

/// Newest refresh against known history: new entries first, fresh
/// records win collisions, and the older-page cursor is carried over
/// untouched.
fn newest_remerge(
    old: &DayBucket,
    page: &ClipPage,
    new_map: IndexMap<ClipKey, ClipRecord>,
) -> DayBucket {
    let mut clips = new_map;
    for (key, clip) in &old.clips {
        clips.entry(key.clone()).or_insert_with(|| clip.clone());
    }
    DayBucket {
        last_clip_index: old.last_clip_index,
        initial_clip_count: page.total_count,
        clips,
        ..Default::default()
    }
}

/// "Load older" continuation: the page arrived oldest-first, so it is
/// appended in reverse, leaving the oldest record at the tail. Known
/// identities are never overridden by a continuation.
fn continuation_merge(old: &DayBucket, params: FetchParams, page: &ClipPage) -> DayBucket {
    let mut page_map = IndexMap::with_capacity(page.clips.len());
    for clip in &page.clips {
        page_map.insert(clip.key(), clip.clone());
    }

    let mut clips = old.clips.clone();
    for (key, clip) in page_map.into_iter().rev() {
        clips.entry(key).or_insert(clip);
    }

    DayBucket {
        // Tracks the offset requested, not a cursor derived from the
        // merged size.
        last_clip_index: params.first_clip_index,
        initial_clip_count: old.initial_clip_count,
        clips,
        ..Default::default()
    }
}

/// Gap heuristic for a newest refresh over existing history: if the
/// totals imply more new records than the page could carry, or the
/// oldest cached clip did not reappear in the page, the two windows
/// may not be contiguous. Log and report, merge regardless.
fn detect_window_gap(
    query: &ClipQuery,
    old: &DayBucket,
    params: FetchParams,
    page: &ClipPage,
    new_map: &IndexMap<ClipKey, ClipRecord>,
) -> Option<WindowGap> {
    let clip_gap = page.total_count - old.initial_clip_count - params.num_clips as i64;
    let oldest_old_clip_in_new_page = old
        .clips
        .keys()
        .last()
        .map_or(true, |key| new_map.contains_key(key));

    if clip_gap > 0 || !oldest_old_clip_in_new_page {
        tracing::warn!(
            camera = %query.camera,
            rule = %query.rule,
            day = %query.day,
            clip_gap,
            oldest_old_clip_in_new_page,
            "Newest page may not be contiguous with cached history; merging anyway",
        );
        Some(WindowGap {
            clip_gap,
            oldest_old_clip_in_new_page,
        })
    } else {
        None
    }
}
