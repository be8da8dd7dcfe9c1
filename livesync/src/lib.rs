//! livesync library crate.
//!
//! Batch reconciliation of YouTube live status for a set of monitored
//! channels. The binary wires the SQLite stores and the YouTube prober into a
//! [`monitor::Reconciler`] and runs passes on demand or on an interval.

pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod utils;

pub use error::{Error, Result};
