//! Repository layer for database access.
//!
//! Each collaborator of the reconciler is a narrow trait with a SQLx
//! implementation; the SQLx types carry extra inspection helpers.

pub mod broadcast;
pub mod live_status;
pub mod subject;

pub use broadcast::*;
pub use live_status::*;
pub use subject::*;
