//! Application layer - content recovery and use cases.
//!
//! `locator`, `binary_text`, `cleaner` and `resolver` turn a message row into
//! printable text; the remaining modules build, format and split transcripts.

pub mod batcher;
pub mod binary_text;
pub mod cleaner;
pub mod formatter;
pub mod locator;
pub mod resolver;
pub mod transcript;

pub use batcher::{
    chunk_file_name, estimate_tokens, format_batch_summary, render_chunk, split_transcript, Chunk,
    ChunkReport,
};
pub use formatter::{
    format_detailed, format_entries_json, format_entries_table, format_handles_table,
    format_simple, format_summary, OutputFormat,
};
pub use transcript::build_transcript;
