//! Watchpost domain types and pure helpers.
//!
//! Everything in this crate is synchronous and side-effect free: clip
//! records and their cache identities, composite appliance timestamps,
//! calendar-day keys, and the camera/rule model reported by the
//! appliance. The async machinery (RPC contract, caching, pagination)
//! lives in `watchpost-rpc` and `watchpost-clips`.

pub mod camera;
pub mod clip;
pub mod error;
pub mod thumbs;
pub mod time;

pub use camera::{Camera, CameraDirectory, CameraState, Rule};
pub use clip::{ClipKey, ClipObject, ClipRecord, ClipTime};
pub use error::CoreError;
pub use time::DayKey;
