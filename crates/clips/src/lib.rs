//! Clip cache and incremental pagination engine.
//!
//! The appliance reports recorded clips as an ordered, server-side
//! list per (camera, rule, calendar-day) view, fetched in pages that
//! can grow or shift between calls. This crate owns the client-side
//! consistency story:
//!
//! - [`ClipCache`] -- layered camera → rule → day mapping of
//!   [`DayBucket`]s holding ordered, deduplicated clip records plus
//!   pagination bookkeeping; every update yields a new copy-on-write
//!   snapshot.
//! - [`ClipPager`] -- the per-view state machine that decides between
//!   "fetch newest" and "load older", computes page offsets,
//!   enforces single-flight fetches, and discards responses that
//!   resolve after the view has moved on.

pub mod cache;
pub mod error;
pub mod pager;

pub use cache::{ClipCache, ClipQuery, DayBucket, FetchParams, MergeReport, WindowGap};
pub use error::{ClipCacheError, PagerError};
pub use pager::{ClipPager, FetchOutcome, ViewState, NUM_CLIPS_PER_REQUEST};
