//! Infrastructure layer - external adapters (database, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod export_writer;
pub mod message_db;
pub mod messages_paths;

pub use config::{ensure_config_exists, load_config};
pub use export_writer::{write_chunks, write_exports};
pub use message_db::MessageDb;
pub use messages_paths::resolve_messages_db;
