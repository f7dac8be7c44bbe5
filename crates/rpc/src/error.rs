/// Errors surfaced across the appliance RPC seam.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    /// The call never produced a usable response (network, framing).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The appliance answered with a non-success envelope.
    #[error("Call failed: {0}")]
    CallFailed(String),

    /// A thumbnail lookup failed for one specific clip.
    #[error(transparent)]
    Thumbnail(#[from] ThumbnailFetchError),
}

/// Per-item failure inside a thumbnail batch response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Thumbnail fetch failed: {message}")]
pub struct ThumbnailFetchError {
    pub message: String,
}

impl ThumbnailFetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
