//! Domain layer - core types.
//!
//! This layer contains pure domain models, configuration and error types
//! without any I/O.

pub mod config;
pub mod error;
pub mod models;

pub use config::{AppConfig, BatchConfig, ExportConfig, ExtractionRules};
pub use error::{AppError, Result};
pub use models::{ExtractedText, Handle, MessageRecord, Transcript, TranscriptEntry};
