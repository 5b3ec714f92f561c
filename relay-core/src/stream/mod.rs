//! NDJSON event streaming (§4.19, C21).

pub mod ndjson;

pub use ndjson::NdjsonWriter;
