//! End-to-end pagination against a synthetic appliance holding a full
//! day of clips.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;

use watchpost_clips::{ClipPager, ClipQuery, FetchOutcome, ViewState};
use watchpost_core::{Camera, ClipRecord, ClipTime, DayKey};
use watchpost_rpc::{
    ApplianceRpc, ClipPage, RpcError, ThumbnailFetchError, ThumbnailRequest,
};

const CAMERA: &str = "Front door";
const RULE: &str = "All objects";
const BASE_SECS: i64 = 1_649_980_800; // 2022-04-15 00:00:00 UTC

fn clip(index: i64) -> ClipRecord {
    let secs = BASE_SECS + index * 60;
    ClipRecord {
        camera_name: CAMERA.to_string(),
        start_time: ClipTime::new(secs, 0),
        stop_time: ClipTime::new(secs + 45, 0),
        thumbnail_time: ClipTime::new(secs + 10, 0),
        display_time: format!("clip {index}"),
        objects: vec![],
    }
}

/// In-memory appliance: one ordered clip list per day, index 0 oldest.
/// Pages exactly the way the real server does -- an oldest-first
/// request walks forward from `first_clip_index`, a newest request
/// returns the head of the list newest-first.
struct FakeAppliance {
    clips: Mutex<Vec<ClipRecord>>,
}

impl FakeAppliance {
    fn with_clip_count(n: i64) -> Self {
        Self {
            clips: Mutex::new((0..n).map(clip).collect()),
        }
    }

    fn record_more(&self, n: i64) {
        let mut clips = self.clips.lock().unwrap();
        let next = clips.len() as i64;
        for i in next..next + n {
            clips.push(clip(i));
        }
    }
}

#[async_trait]
impl ApplianceRpc for FakeAppliance {
    async fn fetch_clips_for_camera_rule(
        &self,
        camera: &str,
        _rule: &str,
        _search_time_secs: i64,
        num_clips: usize,
        first_clip_index: i64,
        oldest_first: bool,
    ) -> Result<ClipPage, RpcError> {
        if camera != CAMERA {
            return Ok(ClipPage {
                success: true,
                clips: vec![],
                total_count: 0,
            });
        }
        let clips = self.clips.lock().unwrap();
        let total = clips.len() as i64;
        let page = if oldest_first {
            let start = first_clip_index.clamp(0, total) as usize;
            clips.iter().skip(start).take(num_clips).cloned().collect()
        } else {
            clips.iter().rev().take(num_clips).cloned().collect()
        };
        Ok(ClipPage {
            success: true,
            clips: page,
            total_count: total,
        })
    }

    async fn fetch_thumbnail_uris(
        &self,
        requests: &[ThumbnailRequest],
    ) -> Result<Vec<Result<String, ThumbnailFetchError>>, RpcError> {
        Ok(requests
            .iter()
            .map(|r| Ok(format!("/thumb/{}{}.jpg", r.camera_name, r.time.epoch_secs)))
            .collect())
    }

    async fn fetch_clip_uri(
        &self,
        _camera: &str,
        _start: ClipTime,
        _stop: ClipTime,
        _mime_type: &str,
        _extras: &serde_json::Value,
    ) -> Result<String, RpcError> {
        Ok(String::new())
    }

    async fn fetch_clip_uri_for_download(
        &self,
        _camera: &str,
        _start: ClipTime,
        _stop: ClipTime,
        _mime_type: &str,
        _extras: &serde_json::Value,
    ) -> Result<String, RpcError> {
        Ok(String::new())
    }

    async fn fetch_all_cameras_and_rules(&self) -> Result<Vec<Camera>, RpcError> {
        Ok(vec![])
    }

    async fn fetch_camera_details(&self, _camera: &str) -> Result<Camera, RpcError> {
        Err(RpcError::CallFailed("unknown camera".to_string()))
    }

    async fn set_camera_enabled(&self, _camera: &str, _enabled: bool) -> Result<(), RpcError> {
        Ok(())
    }

    async fn set_rule_enabled(&self, _rule: &str, _enabled: bool) -> Result<(), RpcError> {
        Ok(())
    }

    async fn ping(&self) -> Result<bool, RpcError> {
        Ok(true)
    }
}

fn day_query() -> ClipQuery {
    ClipQuery::new(CAMERA, RULE, DayKey::parse("20220415").unwrap())
}

#[tokio::test]
async fn pages_through_a_large_day_to_the_oldest_clip() {
    let appliance = Arc::new(FakeAppliance::with_clip_count(1200));
    let pager = ClipPager::new(Arc::clone(&appliance));
    pager.select(day_query()).await;

    // First page: newest 500 of 1200.
    let outcome = pager.fetch_newest().await.unwrap();
    assert_matches!(outcome, FetchOutcome::Applied(report) if report.bucket_len == 500);

    let cache = pager.snapshot().await;
    let bucket = cache.bucket(&day_query()).unwrap();
    assert_eq!(bucket.last_clip_index, 700);
    assert_eq!(bucket.current_clip_count, 1200);
    assert!(bucket.has_older());

    // Two continuations reach the start of the day.
    let outcome = pager.load_older().await.unwrap();
    assert_matches!(outcome, FetchOutcome::Applied(report) if report.bucket_len == 1000);
    let outcome = pager.load_older().await.unwrap();
    assert_matches!(outcome, FetchOutcome::Applied(report) if report.bucket_len == 1200);

    let cache = pager.snapshot().await;
    let bucket = cache.bucket(&day_query()).unwrap();
    assert_eq!(bucket.last_clip_index, 0);
    assert!(!bucket.has_older());

    // Order is newest first, one entry per clip, no holes.
    let keys: Vec<_> = bucket.clips.keys().cloned().collect();
    assert_eq!(keys.len(), 1200);
    assert_eq!(keys[0], clip(1199).key());
    assert_eq!(keys[1199], clip(0).key());
    for (offset, key) in keys.iter().enumerate() {
        assert_eq!(*key, clip(1199 - offset as i64).key());
    }

    // A further request is answered from the cache alone.
    let outcome = pager.load_older().await.unwrap();
    assert_matches!(outcome, FetchOutcome::Exhausted);
    assert_eq!(pager.state().await, ViewState::Idle);
}

#[tokio::test]
async fn refresh_picks_up_clips_recorded_since_the_first_fetch() {
    let appliance = Arc::new(FakeAppliance::with_clip_count(400));
    let pager = ClipPager::new(Arc::clone(&appliance));
    pager.select(day_query()).await;

    pager.fetch_newest().await.unwrap();
    appliance.record_more(8);

    let outcome = pager.fetch_newest().await.unwrap();
    let report = match outcome {
        FetchOutcome::Applied(report) => report,
        other => panic!("expected Applied, got {other:?}"),
    };
    assert_eq!(report.appended, 8);
    assert!(report.inconsistency.is_none());

    let cache = pager.snapshot().await;
    let bucket = cache.bucket(&day_query()).unwrap();
    assert_eq!(bucket.current_clip_count, 408);
    assert_eq!(*bucket.clips.keys().next().unwrap(), clip(407).key());
    // The older-page cursor survived the refresh.
    assert_eq!(bucket.last_clip_index, 0);
}

#[tokio::test]
async fn refresh_after_heavy_recording_reports_a_window_gap() {
    let appliance = Arc::new(FakeAppliance::with_clip_count(600));
    let pager = ClipPager::new(Arc::clone(&appliance));
    pager.select(day_query()).await;

    pager.fetch_newest().await.unwrap();
    // More new clips than one page can bridge.
    appliance.record_more(700);

    let outcome = pager.fetch_newest().await.unwrap();
    let report = match outcome {
        FetchOutcome::Applied(report) => report,
        other => panic!("expected Applied, got {other:?}"),
    };
    let gap = report.inconsistency.expect("gap should be reported");
    assert_eq!(gap.clip_gap, 200); // 1300 - 600 - 500
    assert!(!gap.oldest_old_clip_in_new_page);
}

#[tokio::test]
async fn switching_views_keeps_previously_cached_days() {
    let appliance = Arc::new(FakeAppliance::with_clip_count(40));
    let pager = ClipPager::new(Arc::clone(&appliance));

    pager.select(day_query()).await;
    pager.fetch_newest().await.unwrap();

    let other = ClipQuery::new("Back yard", RULE, DayKey::parse("20220415").unwrap());
    pager.select(other.clone()).await;
    pager.fetch_newest().await.unwrap();

    let cache = pager.snapshot().await;
    assert_eq!(cache.bucket(&day_query()).unwrap().clips.len(), 40);
    assert!(cache.has_bucket(&other));
    assert_eq!(cache.clip_count(&other), 0);
}
