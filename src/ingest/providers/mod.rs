// src/ingest/providers/mod.rs
pub mod feed_xml;
