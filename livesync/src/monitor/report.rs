//! Pass reports.
//!
//! A pass yields one [`BatchReport`]. Its JSON form is either the completed
//! document (`success: true` with counts and per-subject results) or the
//! total-failure document (`success: false`, message and timestamp only).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{LiveVerdict, Subject};

/// Outcome of reconciling one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub subject_id: String,
    pub display_name: String,
    pub external_channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_title: Option<String>,
    #[serde(rename = "success")]
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ReconciliationResult {
    /// The probe succeeded. `store_error` carries a failed status write, if any.
    pub fn probed(subject: &Subject, verdict: &LiveVerdict, store_error: Option<String>) -> Self {
        Self {
            subject_id: subject.id.clone(),
            display_name: subject.display_name.clone(),
            external_channel_id: subject.external_channel_id.clone(),
            is_live: Some(verdict.is_live),
            stream_title: verdict.stream_title.clone(),
            succeeded: true,
            error_message: store_error,
        }
    }

    /// The live status could not be determined.
    pub fn failed(subject: &Subject, error: impl Into<String>) -> Self {
        Self {
            subject_id: subject.id.clone(),
            display_name: subject.display_name.clone(),
            external_channel_id: subject.external_channel_id.clone(),
            is_live: None,
            stream_title: None,
            succeeded: false,
            error_message: Some(error.into()),
        }
    }

    pub fn is_live(&self) -> bool {
        self.is_live == Some(true)
    }
}

/// Aggregate report of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: bool,
    pub checked_count: usize,
    pub live_count: usize,
    pub results: Vec<ReconciliationResult>,
    pub timestamp: DateTime<Utc>,
    pub error_message: Option<String>,
}

impl BatchReport {
    /// Assemble a completed pass. `live_count` is derived from `results`.
    pub fn completed(results: Vec<ReconciliationResult>, timestamp: DateTime<Utc>) -> Self {
        let live_count = results.iter().filter(|r| r.is_live()).count();
        Self {
            succeeded: true,
            checked_count: results.len(),
            live_count,
            results,
            timestamp,
            error_message: None,
        }
    }

    /// The pass could not run at all (subject list unavailable).
    pub fn failed(error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            succeeded: false,
            checked_count: 0,
            live_count: 0,
            results: Vec::new(),
            timestamp,
            error_message: Some(error.into()),
        }
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.succeeded).count()
    }

    /// Serializable document for callers.
    pub fn to_document(&self) -> ReportDocument<'_> {
        if self.succeeded {
            ReportDocument::Completed {
                success: true,
                checked_count: self.checked_count,
                live_count: self.live_count,
                results: &self.results,
                timestamp: self.timestamp,
            }
        } else {
            ReportDocument::Failed {
                success: false,
                error_message: self.error_message.as_deref().unwrap_or("unknown error"),
                timestamp: self.timestamp,
            }
        }
    }
}

/// Wire shape of a [`BatchReport`].
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportDocument<'a> {
    #[serde(rename_all = "camelCase")]
    Completed {
        success: bool,
        checked_count: usize,
        live_count: usize,
        results: &'a [ReconciliationResult],
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        success: bool,
        error_message: &'a str,
        timestamp: DateTime<Utc>,
    },
}
