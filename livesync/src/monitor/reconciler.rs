//! Batch live-status reconciler.
//!
//! One pass loads the eligible subjects, probes each channel, records the
//! observed status and materializes a broadcast record for every live video
//! seen. Failures are contained per subject; only a failed subject listing
//! fails the whole pass.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::database::repositories::{BroadcastStore, StatusStore, SubjectRepository};
use crate::domain::{BroadcastRecord, LiveVerdict, Platform, StatusRecord, Subject};
use crate::{Error, Result};

use super::prober::LiveProber;
use super::report::{BatchReport, ReconciliationResult};

/// Configuration for the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Upper bound for a single probe.
    pub probe_timeout: Duration,
    /// Upper bound for a single store call.
    pub store_timeout: Duration,
    /// Subjects processed concurrently within a pass.
    pub max_concurrent_checks: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(15),
            store_timeout: Duration::from_secs(10),
            max_concurrent_checks: 4,
        }
    }
}

/// What the ensure step did for a live video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// A new broadcast record was inserted.
    Created,
    /// A record for this video already existed.
    AlreadyRecorded,
    /// A concurrent writer inserted the record between lookup and insert.
    LostRace,
}

/// Reconciles the live status of all eligible subjects.
pub struct Reconciler<R, P, S, B>
where
    R: SubjectRepository + 'static,
    P: LiveProber + 'static,
    S: StatusStore + 'static,
    B: BroadcastStore + 'static,
{
    subjects: Arc<R>,
    prober: Arc<P>,
    status_store: Arc<S>,
    broadcast_store: Arc<B>,
    platform: Platform,
    config: ReconcilerConfig,
}

impl<R, P, S, B> Reconciler<R, P, S, B>
where
    R: SubjectRepository + 'static,
    P: LiveProber + 'static,
    S: StatusStore + 'static,
    B: BroadcastStore + 'static,
{
    pub fn new(
        subjects: Arc<R>,
        prober: Arc<P>,
        status_store: Arc<S>,
        broadcast_store: Arc<B>,
    ) -> Self {
        Self::with_config(
            subjects,
            prober,
            status_store,
            broadcast_store,
            ReconcilerConfig::default(),
        )
    }

    pub fn with_config(
        subjects: Arc<R>,
        prober: Arc<P>,
        status_store: Arc<S>,
        broadcast_store: Arc<B>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            subjects,
            prober,
            status_store,
            broadcast_store,
            platform: Platform::Youtube,
            config,
        }
    }

    /// Run one reconciliation pass.
    ///
    /// Never returns an error: a failed subject listing produces a failed
    /// report, any other failure is recorded on the affected subject.
    pub async fn run_pass(&self) -> BatchReport {
        let subjects = match self.subjects.list_eligible_subjects().await {
            Ok(subjects) => subjects,
            Err(e) => {
                error!(error = %e, "Failed to load eligible subjects");
                return BatchReport::failed(e.to_string(), Utc::now());
            }
        };

        info!(count = subjects.len(), "Starting live status pass");

        let concurrency = self.config.max_concurrent_checks.max(1);
        let results: Vec<ReconciliationResult> = stream::iter(subjects)
            .map(|subject| async move { self.reconcile_subject(&subject).await })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let report = BatchReport::completed(results, Utc::now());
        info!(
            checked = report.checked_count,
            live = report.live_count,
            failed = report.failure_count(),
            "Live status pass complete"
        );
        report
    }

    /// Reconcile a single subject.
    pub async fn reconcile_subject(&self, subject: &Subject) -> ReconciliationResult {
        let verdict = match self.probe(&subject.external_channel_id).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(
                    subject_id = %subject.id,
                    channel_id = %subject.external_channel_id,
                    error = %e,
                    "Live status probe failed"
                );
                return ReconciliationResult::failed(subject, e.to_string());
            }
        };

        debug!(
            subject_id = %subject.id,
            is_live = verdict.is_live,
            "Probe complete"
        );

        let record = StatusRecord::from_verdict(
            &subject.external_channel_id,
            self.platform,
            &verdict,
            Utc::now(),
        );
        let store_error = match self
            .with_store_timeout("status upsert", self.status_store.upsert_status(&record))
            .await
        {
            Ok(()) => None,
            Err(e) => {
                warn!(subject_id = %subject.id, error = %e, "Failed to record live status");
                Some(e.to_string())
            }
        };

        if verdict.live_video_id().is_some() {
            match self.ensure_broadcast_record(subject, &verdict).await {
                Ok(outcome) => {
                    debug!(subject_id = %subject.id, ?outcome, "Broadcast record ensured");
                }
                Err(e) => {
                    warn!(
                        subject_id = %subject.id,
                        error = %e,
                        "Failed to ensure broadcast record"
                    );
                }
            }
        }

        ReconciliationResult::probed(subject, &verdict, store_error)
    }

    /// Make sure a broadcast record exists for the live video in `verdict`.
    ///
    /// Returns [`Error::Other`] if the verdict carries no live video.
    pub async fn ensure_broadcast_record(
        &self,
        subject: &Subject,
        verdict: &LiveVerdict,
    ) -> Result<EnsureOutcome> {
        let video_id = verdict
            .live_video_id()
            .ok_or_else(|| Error::Other("verdict has no live video".to_string()))?;

        let existing = self
            .with_store_timeout(
                "broadcast lookup",
                self.broadcast_store.find_by_video(&subject.id, video_id),
            )
            .await?;
        if existing.is_some() {
            return Ok(EnsureOutcome::AlreadyRecorded);
        }

        let record = BroadcastRecord::live_from_verdict(
            subject,
            self.platform,
            video_id,
            verdict,
            Utc::now(),
        );
        match self
            .with_store_timeout("broadcast insert", self.broadcast_store.create(&record))
            .await
        {
            Ok(()) => {
                info!(
                    subject_id = %subject.id,
                    video_id = %video_id,
                    "Recorded new live broadcast"
                );
                Ok(EnsureOutcome::Created)
            }
            Err(e) if e.is_duplicate_key() => {
                debug!(
                    subject_id = %subject.id,
                    video_id = %video_id,
                    "Broadcast already inserted concurrently"
                );
                Ok(EnsureOutcome::LostRace)
            }
            Err(e) => Err(e),
        }
    }

    async fn probe(&self, channel_id: &str) -> Result<LiveVerdict> {
        match tokio::time::timeout(self.config.probe_timeout, self.prober.probe(channel_id)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                operation: "probe",
                after: self.config.probe_timeout,
            }),
        }
    }

    async fn with_store_timeout<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                operation,
                after: self.config.store_timeout,
            }),
        }
    }
}
