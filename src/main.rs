//! Breach digest binary entrypoint.
//! Loads config, fetches feeds, writes the dashboard data file once, or on an
//! interval when `DIGEST_INTERVAL_SECS` is set.

use anyhow::{Context, Result};
use breach_digest::ingest::config::load_config_default;
use breach_digest::ingest::providers::feed_xml::providers_from_config;
use breach_digest::ingest::scheduler::{spawn_scheduler, SchedulerCfg};
use breach_digest::output::output_path_default;
use breach_digest::{run_and_write, DigestEngine};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ENV_LOG_JSON: &str = "DIGEST_LOG_JSON";
const ENV_METRICS_PATH: &str = "DIGEST_METRICS_PATH";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("breach_digest=info,digest=info,warn"));

    let json = std::env::var(ENV_LOG_JSON)
        .ok()
        .is_some_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

/// Install a Prometheus recorder when a textfile path is configured.
fn init_metrics() -> Result<Option<(PrometheusHandle, PathBuf)>> {
    let Some(path) = std::env::var(ENV_METRICS_PATH).ok().filter(|p| !p.trim().is_empty()) else {
        return Ok(None);
    };
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("prometheus: install recorder")?;
    Ok(Some((handle, PathBuf::from(path))))
}

fn flush_metrics(metrics: &Option<(PrometheusHandle, PathBuf)>) {
    if let Some((handle, path)) = metrics {
        if let Err(e) = std::fs::write(path, handle.render()) {
            tracing::warn!(error = ?e, path = %path.display(), "writing metrics textfile failed");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    init_tracing();
    let metrics = init_metrics()?;

    let cfg = load_config_default()?;
    tracing::info!(
        sources = cfg.sources.len(),
        vocabulary = %cfg.vocabulary.version,
        per_feed = cfg.limits.per_feed,
        total_cap = cfg.limits.total_cap,
        "config loaded"
    );

    let providers = providers_from_config(&cfg.sources)?;
    let engine = DigestEngine::new(cfg.vocabulary, cfg.limits);
    let output = output_path_default();

    match SchedulerCfg::from_env() {
        None => {
            let result = run_and_write(&engine, &providers, &output).await;
            flush_metrics(&metrics);
            result?;
        }
        Some(sched) => {
            tracing::info!(interval_secs = sched.interval_secs, "running on interval");
            let metrics = Arc::new(metrics);
            let flush = Arc::clone(&metrics);
            let handle = spawn_scheduler(
                sched,
                Arc::new(engine),
                Arc::new(providers),
                output,
                move || flush_metrics(&flush),
            );
            tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
            tracing::info!("shutting down");
            handle.abort();
            flush_metrics(&metrics);
        }
    }

    Ok(())
}
