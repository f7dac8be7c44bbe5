/// Errors produced while applying a fetched page to the cache.
#[derive(Debug, thiserror::Error)]
pub enum ClipCacheError {
    /// The response envelope reported failure; nothing was applied.
    #[error("Clip fetch reported failure; response not applied")]
    FetchFailed,
}

/// Errors surfaced by the pagination controller.
#[derive(Debug, thiserror::Error)]
pub enum PagerError {
    /// The RPC call was rejected or the envelope reported failure.
    /// Recovery is a user-initiated refresh; there is no automatic
    /// retry.
    #[error("Clip fetch failed: {0}")]
    FetchFailed(String),

    /// No (camera, rule, day) view is selected.
    #[error("No active clip view selected")]
    NoSelection,
}
