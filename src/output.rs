// src/output.rs
//! Dashboard data file writer.

use crate::digest::Digest;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_OUTPUT_PATH: &str = "DIGEST_OUTPUT_PATH";
pub const DEFAULT_OUTPUT_PATH: &str = "dashboard/data.json";

/// `$DIGEST_OUTPUT_PATH` or `dashboard/data.json`.
pub fn output_path_default() -> PathBuf {
    std::env::var(ENV_OUTPUT_PATH)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH))
}

/// Pretty JSON, written to `<path>.tmp` then renamed over `path`.
pub fn write_digest(path: &Path, digest: &Digest) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(digest).context("serializing digest")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming onto {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        breaches = digest.breaches.len(),
        rss = digest.rss.len(),
        "digest written"
    );
    Ok(())
}

pub fn read_digest(path: &Path) -> Result<Digest> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))
}
