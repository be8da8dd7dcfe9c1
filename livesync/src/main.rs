use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use livesync::config::AppConfig;
use livesync::database::{
    self,
    repositories::{SqlxBroadcastStore, SqlxStatusStore, SqlxSubjectRepository},
};
use livesync::logging::{self, LOG_RETENTION_DAYS};
use livesync::monitor::{BatchReport, RateLimiter, Reconciler, YoutubeProber};
use livesync::utils::http_client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("loading configuration")?;
    let _log_guard = logging::init_logging(&config.log)?;

    if let Some(dir) = config.log.dir.as_deref()
        && let Err(e) = logging::cleanup_old_logs(Path::new(dir), LOG_RETENTION_DAYS).await
    {
        warn!(error = %e, "Failed to cleanup old logs");
    }

    let pool = database::init_pool(&config.database_url).await?;
    database::run_migrations(&pool).await?;

    let client = http_client::build_client(config.probe_timeout)?;
    let rate_limiter = RateLimiter::new(config.rate_limiter_config()?);
    let prober = YoutubeProber::new(
        client,
        config.youtube_api_key.clone(),
        config.youtube_api_base_url.as_str(),
    )?
    .with_rate_limiter(rate_limiter);

    let reconciler = Reconciler::with_config(
        Arc::new(SqlxSubjectRepository::new(pool.clone())),
        Arc::new(prober),
        Arc::new(SqlxStatusStore::new(pool.clone())),
        Arc::new(SqlxBroadcastStore::new(pool.clone())),
        config.reconciler_config(),
    );

    info!("livesync initialized successfully");

    let Some(interval) = config.interval else {
        let report = reconciler.run_pass().await;
        print_report(&report)?;
        pool.close().await;
        if !report.succeeded {
            anyhow::bail!(
                "pass failed: {}",
                report.error_message.as_deref().unwrap_or("unknown error")
            );
        }
        return Ok(());
    };

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
        shutdown.cancel();
    });

    info!(interval_secs = interval.as_secs(), "Running passes on an interval");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let report = tokio::select! {
                    _ = cancel.cancelled() => break,
                    report = reconciler.run_pass() => report,
                };
                if !report.succeeded {
                    error!(
                        error = report.error_message.as_deref().unwrap_or_default(),
                        "Pass failed"
                    );
                }
                print_report(&report)?;
            }
        }
    }

    pool.close().await;
    info!("livesync stopped");
    Ok(())
}

fn print_report(report: &BatchReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&report.to_document())?;
    println!("{}", json);
    Ok(())
}
