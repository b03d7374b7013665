// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod digest;
pub mod ingest;
pub mod output;

// ---- Re-exports for stable public API ----
pub use crate::digest::{Digest, DigestEngine, Limits, Vocabulary};
pub use crate::ingest::config::{DigestConfig, SourceConfig};
pub use crate::ingest::types::{RawEntry, SourceBatch, SourceKind, SourceProvider};

use std::path::Path;

/// Fetch every provider, build the digest at the current instant, write it.
/// Source failures are absorbed by `ingest::run_once`; only the write can fail.
pub async fn run_and_write(
    engine: &DigestEngine,
    providers: &[Box<dyn SourceProvider>],
    output: &Path,
) -> anyhow::Result<Digest> {
    let batches = ingest::run_once(providers).await;
    let digest = engine.build(&batches, chrono::Utc::now());
    output::write_digest(output, &digest)?;
    Ok(digest)
}
