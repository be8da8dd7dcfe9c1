use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::task::JoinSet;

use livesync::database::models::SubjectDbModel;
use livesync::database::repositories::{
    BroadcastStore, SqlxBroadcastStore, SqlxStatusStore, SqlxSubjectRepository,
};
use livesync::database::{DbPool, init_pool, run_migrations};
use livesync::domain::{LiveVerdict, Platform, Subject};
use livesync::monitor::{EnsureOutcome, LiveProber, Reconciler, ReconcilerConfig};
use livesync::{Error, Result};

type SqlReconciler =
    Reconciler<SqlxSubjectRepository, ScriptedProber, SqlxStatusStore, SqlxBroadcastStore>;

/// Prober answering from a per-channel script; unknown channels are offline.
#[derive(Default)]
struct ScriptedProber {
    script: Mutex<HashMap<String, std::result::Result<LiveVerdict, String>>>,
}

impl ScriptedProber {
    fn set(&self, channel_id: &str, answer: std::result::Result<LiveVerdict, String>) {
        self.script
            .lock()
            .unwrap()
            .insert(channel_id.to_string(), answer);
    }
}

#[async_trait]
impl LiveProber for ScriptedProber {
    async fn probe(&self, external_channel_id: &str) -> Result<LiveVerdict> {
        let answer = self.script.lock().unwrap().get(external_channel_id).cloned();
        match answer {
            Some(Ok(verdict)) => Ok(verdict),
            Some(Err(msg)) => Err(Error::probe(msg)),
            None => Ok(LiveVerdict::offline()),
        }
    }
}

fn live(video_id: &str, title: &str) -> LiveVerdict {
    LiveVerdict {
        is_live: true,
        stream_title: Some(title.to_string()),
        stream_external_video_id: Some(video_id.to_string()),
        stream_url: Some(Platform::Youtube.watch_url(video_id)),
        thumbnail_url: None,
        description: Some("Join us".to_string()),
    }
}

struct Harness {
    _dir: TempDir,
    pool: DbPool,
    prober: Arc<ScriptedProber>,
    status: Arc<SqlxStatusStore>,
    broadcasts: Arc<SqlxBroadcastStore>,
    reconciler: Arc<SqlReconciler>,
}

async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("livesync.db");
    let db_url = format!(
        "sqlite:{}?mode=rwc",
        db_path.to_string_lossy().replace('\\', "/")
    );

    let pool = init_pool(&db_url).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let subjects = SqlxSubjectRepository::new(pool.clone());
    for (id, name, channel, enabled) in [
        ("s1", "Grace Chapel", Some("UC1"), true),
        ("s2", "St. Mark", Some("UC2"), true),
        ("s3", "Hillside", None, true),
        ("s4", "Harbor Church", Some("UC4"), false),
    ] {
        subjects
            .create_subject(
                &SubjectDbModel::new(name, channel.map(str::to_string))
                    .with_id(id)
                    .with_auto_detection(enabled),
            )
            .await
            .unwrap();
    }

    let prober = Arc::new(ScriptedProber::default());
    let status = Arc::new(SqlxStatusStore::new(pool.clone()));
    let broadcasts = Arc::new(SqlxBroadcastStore::new(pool.clone()));
    let reconciler = Arc::new(Reconciler::with_config(
        Arc::new(subjects),
        prober.clone(),
        status.clone(),
        broadcasts.clone(),
        ReconcilerConfig {
            probe_timeout: Duration::from_secs(5),
            store_timeout: Duration::from_secs(5),
            max_concurrent_checks: 4,
        },
    ));

    Harness {
        _dir: dir,
        pool,
        prober,
        status,
        broadcasts,
        reconciler,
    }
}

async fn broadcast_count(pool: &DbPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM broadcasts")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

#[tokio::test]
async fn pass_reconciles_only_eligible_subjects() {
    let h = harness().await;
    h.prober.set("UC1", Ok(live("V1", "Sunday Service")));

    let report = h.reconciler.run_pass().await;

    assert!(report.succeeded);
    assert_eq!(report.checked_count, 2);
    assert_eq!(report.live_count, 1);
    let mut ids: Vec<&str> = report.results.iter().map(|r| r.subject_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, ["s1", "s2"]);

    let s1 = h.status.get_status("UC1", Platform::Youtube).await.unwrap().unwrap();
    assert!(s1.is_live);
    assert_eq!(s1.stream_title.as_deref(), Some("Sunday Service"));
    let s2 = h.status.get_status("UC2", Platform::Youtube).await.unwrap().unwrap();
    assert!(!s2.is_live);
    assert!(h.status.get_status("UC4", Platform::Youtube).await.unwrap().is_none());

    let records = h.broadcasts.list_by_subject("s1").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].external_video_id, "V1");
    assert_eq!(records[0].description, "Join us");
    assert_eq!(records[0].stream_url, "https://www.youtube.com/watch?v=V1");
}

#[tokio::test]
async fn going_offline_clears_stream_fields() {
    let h = harness().await;
    h.prober.set("UC1", Ok(live("V1", "Sunday Service")));
    h.reconciler.run_pass().await;

    h.prober.set("UC1", Ok(LiveVerdict::offline()));
    let report = h.reconciler.run_pass().await;

    assert_eq!(report.live_count, 0);
    let row = h.status.get_status("UC1", Platform::Youtube).await.unwrap().unwrap();
    assert!(!row.is_live);
    assert_eq!(row.stream_title, None);
    assert_eq!(row.stream_url, None);

    // History is kept.
    assert_eq!(broadcast_count(&h.pool).await, 1);
}

#[tokio::test]
async fn repeated_passes_keep_one_record_per_video() {
    let h = harness().await;
    h.prober.set("UC1", Ok(live("V1", "Sunday Service")));

    for _ in 0..3 {
        assert!(h.reconciler.run_pass().await.succeeded);
    }
    assert_eq!(broadcast_count(&h.pool).await, 1);

    h.prober.set("UC1", Ok(live("V2", "Evening Prayer")));
    h.reconciler.run_pass().await;
    assert_eq!(broadcast_count(&h.pool).await, 2);
}

#[tokio::test]
async fn probe_failure_leaves_previous_status() {
    let h = harness().await;
    h.prober.set("UC1", Ok(live("V1", "Sunday Service")));
    h.reconciler.run_pass().await;

    h.prober.set("UC1", Err("quotaExceeded".to_string()));
    let report = h.reconciler.run_pass().await;

    assert!(report.succeeded);
    let failed = report.results.iter().find(|r| r.subject_id == "s1").unwrap();
    assert!(!failed.succeeded);
    assert!(failed.error_message.as_deref().unwrap().contains("quotaExceeded"));

    let row = h.status.get_status("UC1", Platform::Youtube).await.unwrap().unwrap();
    assert!(row.is_live, "a failed probe must not overwrite the stored status");
}

#[tokio::test]
async fn missing_schema_fails_the_pass() {
    let h = harness().await;
    sqlx::query("DROP TABLE subjects")
        .execute(&h.pool)
        .await
        .unwrap();

    let report = h.reconciler.run_pass().await;

    assert!(!report.succeeded);
    assert!(report.results.is_empty());
    let json = serde_json::to_value(report.to_document()).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["errorMessage"].as_str().unwrap().contains("Repository error"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ensure_creates_exactly_one_record() {
    const WORKERS: usize = 16;

    let h = harness().await;
    let subject = Subject::new("s1", "Grace Chapel", "UC1");
    let verdict = live("V1", "Sunday Service");

    let mut workers = JoinSet::new();
    for _ in 0..WORKERS {
        let reconciler = h.reconciler.clone();
        let subject = subject.clone();
        let verdict = verdict.clone();
        workers.spawn(async move { reconciler.ensure_broadcast_record(&subject, &verdict).await });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = workers.join_next().await {
        outcomes.push(joined.unwrap().unwrap());
    }

    let created = outcomes
        .iter()
        .filter(|o| **o == EnsureOutcome::Created)
        .count();
    assert_eq!(created, 1, "outcomes: {:?}", outcomes);
    assert_eq!(outcomes.len(), WORKERS);
    assert_eq!(broadcast_count(&h.pool).await, 1);
    assert!(h.broadcasts.find_by_video("s1", "V1").await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_passes_do_not_duplicate() {
    let h = harness().await;
    h.prober.set("UC1", Ok(live("V1", "Sunday Service")));
    h.prober.set("UC2", Ok(live("V9", "Vespers")));

    let mut passes = JoinSet::new();
    for _ in 0..4 {
        let reconciler = h.reconciler.clone();
        passes.spawn(async move { reconciler.run_pass().await });
    }
    while let Some(joined) = passes.join_next().await {
        let report = joined.unwrap();
        assert!(report.succeeded);
        assert!(report.results.iter().all(|r| r.succeeded));
    }

    assert_eq!(broadcast_count(&h.pool).await, 2);
}
