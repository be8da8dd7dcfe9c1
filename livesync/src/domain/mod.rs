//! Domain layer for livesync.
//!
//! Typed records exchanged between the reconciler and its collaborators.

pub mod broadcast;
pub mod live_status;
pub mod platform;
pub mod subject;
pub mod verdict;

pub use broadcast::BroadcastRecord;
pub use live_status::StatusRecord;
pub use platform::{BroadcastStatus, Platform};
pub use subject::Subject;
pub use verdict::LiveVerdict;
