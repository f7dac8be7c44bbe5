//! The appliance RPC contract.
//!
//! Transport framing is out of scope here: an implementation may speak
//! XML-RPC, JSON, or be an in-memory fake. The engine only relies on
//! the call shapes and the `[success, payload, ...]` envelope
//! semantics captured by these signatures.

use async_trait::async_trait;

use watchpost_core::{Camera, ClipRecord, ClipTime};

use crate::error::{RpcError, ThumbnailFetchError};

/// Decoded `[success, clips, totalCount]` envelope for a clip query.
///
/// `success = false` means the appliance processed the call but
/// refused it; the page must not be applied to any cache.
#[derive(Debug, Clone, Default)]
pub struct ClipPage {
    pub success: bool,
    pub clips: Vec<ClipRecord>,
    /// Total clips the server currently reports for the queried day.
    pub total_count: i64,
}

/// One thumbnail lookup: camera plus the clip's thumbnail timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub camera_name: String,
    pub time: ClipTime,
}

/// Remote procedure surface of the video-surveillance appliance.
///
/// Every method resolves to a transport or envelope error on failure;
/// none of them retries internally.
#[async_trait]
pub trait ApplianceRpc: Send + Sync {
    /// Fetch one page of clips for a (camera, rule) pair around
    /// `search_time_secs`.
    ///
    /// `first_clip_index` is the absolute index of the first clip
    /// requested (0 = oldest clip of the day); implementations clamp
    /// negative values to 0. `oldest_first` selects server-side page
    /// ordering: `false` returns the newest clips first.
    async fn fetch_clips_for_camera_rule(
        &self,
        camera: &str,
        rule: &str,
        search_time_secs: i64,
        num_clips: usize,
        first_clip_index: i64,
        oldest_first: bool,
    ) -> Result<ClipPage, RpcError>;

    /// Resolve thumbnail image URIs for a batch of clips.
    ///
    /// Item order matches `requests`; individual lookups can fail
    /// without failing the batch.
    async fn fetch_thumbnail_uris(
        &self,
        requests: &[ThumbnailRequest],
    ) -> Result<Vec<Result<String, ThumbnailFetchError>>, RpcError>;

    /// Resolve a playable URI for one clip.
    ///
    /// `extras` carries opaque request options (object IDs, size
    /// limits) passed through to the appliance unchanged.
    async fn fetch_clip_uri(
        &self,
        camera: &str,
        start: ClipTime,
        stop: ClipTime,
        mime_type: &str,
        extras: &serde_json::Value,
    ) -> Result<String, RpcError>;

    /// Resolve a downloadable URI for one clip (attachment headers).
    async fn fetch_clip_uri_for_download(
        &self,
        camera: &str,
        start: ClipTime,
        stop: ClipTime,
        mime_type: &str,
        extras: &serde_json::Value,
    ) -> Result<String, RpcError>;

    /// List every camera with its rules.
    async fn fetch_all_cameras_and_rules(&self) -> Result<Vec<Camera>, RpcError>;

    /// Fetch one camera's details and rules.
    async fn fetch_camera_details(&self, camera: &str) -> Result<Camera, RpcError>;

    /// Turn a camera on or off.
    async fn set_camera_enabled(&self, camera: &str, enabled: bool) -> Result<(), RpcError>;

    /// Enable or disable a detection rule.
    async fn set_rule_enabled(&self, rule: &str, enabled: bool) -> Result<(), RpcError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<bool, RpcError>;
}
