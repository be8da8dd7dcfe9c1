//! Database models for livesync.
//!
//! These models map directly to the database schema; timestamps are epoch
//! milliseconds and enums are stored as their lowercase names.

pub mod broadcast;
pub mod live_status;
pub mod subject;

pub use broadcast::*;
pub use live_status::*;
pub use subject::*;
