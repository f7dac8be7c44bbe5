//! Bounded-concurrency admission gate for thumbnail lookups.
//!
//! The appliance enforces a hard ceiling on concurrent connections,
//! and a clip list renders one thumbnail per visible clip; letting
//! every visible thumbnail issue its own lookup in parallel exceeds
//! that ceiling and cascades into failed calls. [`ThumbnailQueue`]
//! caps the number of in-flight lookups; excess submissions wait in
//! FIFO order with no bound on queue length.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::api::{ApplianceRpc, ThumbnailRequest};
use crate::error::RpcError;

/// Default in-flight lookup ceiling. Ten balances thumbnail fill speed
/// against the appliance connection limit.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// FIFO admission gate in front of [`ApplianceRpc::fetch_thumbnail_uris`].
///
/// Construct once per RPC client and clone freely; all clones share
/// the same permit pool.
pub struct ThumbnailQueue<R> {
    rpc: Arc<R>,
    permits: Arc<Semaphore>,
}

impl<R> Clone for ThumbnailQueue<R> {
    fn clone(&self) -> Self {
        Self {
            rpc: Arc::clone(&self.rpc),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<R: ApplianceRpc> ThumbnailQueue<R> {
    pub fn new(rpc: Arc<R>) -> Self {
        Self::with_limit(rpc, DEFAULT_MAX_CONCURRENT)
    }

    /// Create a queue admitting at most `max_concurrent` lookups at a
    /// time.
    pub fn with_limit(rpc: Arc<R>, max_concurrent: usize) -> Self {
        Self {
            rpc,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Resolve the thumbnail URI for one clip.
    ///
    /// Waits for a permit, then issues a single-item batch lookup.
    /// Queueing is transparent: the result is exactly what the
    /// underlying call produced for this item.
    pub async fn fetch_uri(&self, request: ThumbnailRequest) -> Result<String, RpcError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RpcError::Transport("thumbnail queue closed".to_string()))?;

        let results = self
            .rpc
            .fetch_thumbnail_uris(std::slice::from_ref(&request))
            .await?;

        match results.into_iter().next() {
            Some(Ok(uri)) => Ok(uri),
            Some(Err(e)) => {
                tracing::debug!(
                    camera = %request.camera_name,
                    error = %e,
                    "Thumbnail lookup failed",
                );
                Err(RpcError::Thumbnail(e))
            }
            None => Err(RpcError::CallFailed(
                "empty thumbnail response".to_string(),
            )),
        }
    }
}
