//! Appliance RPC contract and request scheduling.
//!
//! Defines the [`ApplianceRpc`] trait -- the seam between the
//! clip-browsing engine and whatever transport actually speaks to the
//! appliance -- plus [`ThumbnailQueue`], the bounded-concurrency
//! admission gate in front of thumbnail lookups.

pub mod api;
pub mod error;
pub mod thumbs;

pub use api::{ApplianceRpc, ClipPage, ThumbnailRequest};
pub use error::{RpcError, ThumbnailFetchError};
pub use thumbs::ThumbnailQueue;
