// src/ingest/scheduler.rs
use crate::digest::DigestEngine;
use crate::ingest::types::SourceProvider;
use metrics::counter;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const ENV_INTERVAL_SECS: &str = "DIGEST_INTERVAL_SECS";

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub interval_secs: u64,
}

impl SchedulerCfg {
    /// `Some` when `$DIGEST_INTERVAL_SECS` holds a positive integer.
    pub fn from_env() -> Option<Self> {
        parse_interval(std::env::var(ENV_INTERVAL_SECS).ok())
    }
}

fn parse_interval(raw: Option<String>) -> Option<SchedulerCfg> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
        .map(|interval_secs| SchedulerCfg { interval_secs })
}

/// Re-run fetch → digest → write on a fixed interval. The first tick fires
/// immediately. A failing tick is logged and the loop carries on.
///
/// `after_run` is called once per tick, after the write (or failure), so
/// anything it exports sees the complete run.
pub fn spawn_scheduler<F>(
    cfg: SchedulerCfg,
    engine: Arc<DigestEngine>,
    providers: Arc<Vec<Box<dyn SourceProvider>>>,
    output: PathBuf,
    after_run: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(cfg.interval_secs));
        loop {
            ticker.tick().await;
            counter!("digest_runs_total").increment(1);
            match crate::run_and_write(&engine, &providers, &output).await {
                Ok(d) => tracing::info!(
                    target: "digest",
                    breaches = d.breaches.len(),
                    rss = d.rss.len(),
                    "scheduled digest tick"
                ),
                Err(e) => tracing::warn!(error = ?e, "scheduled digest tick failed"),
            }
            after_run();
        }
    })
}
