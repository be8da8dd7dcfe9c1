//! Live status monitoring.
//!
//! - [`prober`]: asks the provider whether a channel is live
//! - [`reconciler`]: runs a pass over all eligible subjects
//! - [`report`]: the per-pass report and its JSON document
//! - [`rate_limiter`]: token bucket shared by provider calls

pub mod prober;
mod rate_limiter;
pub mod reconciler;
pub mod report;
pub mod youtube;

pub use prober::{DEFAULT_YOUTUBE_API_BASE_URL, LiveProber, YoutubeProber};
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use reconciler::{EnsureOutcome, Reconciler, ReconcilerConfig};
pub use report::{BatchReport, ReconciliationResult, ReportDocument};
